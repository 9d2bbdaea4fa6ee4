//! # rust-rulesets
//!
//! A deterministic rules engine for turn-based games. Given a state and a
//! proposed action it answers two questions: *is this legal, and why?* and
//! *what is the state afterwards?*
//!
//! ## Design Principles
//!
//! 1. **Explainable**: every legality decision comes with a reason string or
//!    a step-by-step `Explanation`, including the numbers behind damage.
//!
//! 2. **Rejections Are Values**: an illegal move is an answer, not an error.
//!    `RulesError` is reserved for caller defects (bad payloads, wrong state
//!    type, applying what was never legal).
//!
//! 3. **Deterministic**: no randomness, no clocks, no global state. Same
//!    state plus same action always yields the same result.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: missions and boards are built on `im`
//!   maps, so cloning for a new session or a self-check probe is O(1).
//!
//! - **Closed Action Sets**: each ruleset parses payloads into an enum and
//!   dispatches with an exhaustive `match`.
//!
//! - **Uniform Contract**: hosts drive every variant through the `Ruleset`
//!   trait and look variants up in a `RulesetRegistry` they own.
//!
//! ## Modules
//!
//! - `core`: errors, configuration, explanations, binary snapshots
//! - `tbs`: tactical battle (stats, reachability, combat, initiative, skills)
//! - `chess`: chess legality, check detection, FEN
//! - `rules`: the `Ruleset` / `GameState` contract and the registry
//!
//! ## Example
//!
//! ```
//! use rust_rulesets::core::RulesConfig;
//! use rust_rulesets::rules::RulesetRegistry;
//! use serde_json::json;
//!
//! let registry = RulesetRegistry::with_defaults(&RulesConfig::default());
//! let chess = registry.get("chess").unwrap();
//! let mut game = chess.create(None).unwrap();
//!
//! let e4 = json!({"type": "move", "src": "e2", "dst": "e4"});
//! assert!(chess.evaluate(game.as_ref(), &e4).unwrap().ok);
//! assert!(chess.apply(game.as_mut(), &e4).unwrap().ok);
//! assert_eq!(chess.summarize(game.as_ref()).unwrap()["turn"], "black");
//! ```

pub mod core;
pub mod tbs;
pub mod chess;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    ApplyOutcome, Explanation, Step,
    RulesConfig, TbsConfig, ChessConfig,
    Result, RulesError,
};

pub use crate::rules::{GameState, Ruleset, RulesetRegistry, Scheduler};

pub use crate::tbs::{
    TbsAction, TbsEngine, TbsRuleset, TbsSession,
    Mission, Unit, Coord, Side, StatName,
    Verdict, LegalAction, AttackEvaluation,
};

pub use crate::chess::{
    ChessRuleset, ChessState, ChessStatus, ChessSummary,
    Color, Piece, PieceKind, Square,
};
