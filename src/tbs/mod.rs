//! Tactical battle ruleset.
//!
//! Units on a tile grid act one at a time in initiative order, spending
//! action points on moves, attacks and skills. Every stat a rule reads is
//! an *effective* stat: the base value with item, injury, aura, terrain,
//! skill and mission modifiers stacked on top.
//!
//! ## Layers
//!
//! - `model`: units, map, mission (plain data, serde)
//! - `stats`, `reach`, `combat`: pure calculators over a mission
//! - `turn`, `effects`, `victory`: scheduler and end-of-turn bookkeeping
//! - `handlers`: per-action `evaluate` / `apply`
//! - `engine`: `TbsEngine`, the session-level API with enumeration and logging
//! - `ruleset`: the `Ruleset` adapter for hosts

pub mod action;
pub mod combat;
pub mod demo;
pub mod effects;
pub mod engine;
pub mod handlers;
pub mod log;
pub mod model;
pub mod reach;
pub mod ruleset;
pub mod session;
pub mod stats;
pub mod turn;
pub mod victory;

pub use action::{AttackAction, MoveAction, TbsAction, UseSkillAction};
pub use combat::{AttackEvaluation, AttackPreview};
pub use demo::{demo_mission, demo_session};
pub use engine::{LegalAction, Processed, TbsEngine};
pub use handlers::Verdict;
pub use log::{ActionLog, ActionLogEntry, LogResult, MemoryLog, TracingLog};
pub use model::{
    Aura, Coord, Goal, Injury, Item, MapGrid, Mission, MissionStatus, ModifierSource, Operation, Side, Skill,
    SkillKind, SkillTarget, StatModifier, StatName, Terrain, Unit,
};
pub use ruleset::TbsRuleset;
pub use session::TbsSession;
pub use stats::{EffectiveStat, StatBreakdown};
