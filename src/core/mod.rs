//! Core engine types shared by every ruleset: errors, configuration,
//! explanations, and binary snapshots.
//!
//! Nothing here knows about units or pieces; rulesets build on top.

pub mod config;
pub mod error;
pub mod explain;
pub mod snapshot;

pub use config::{ChessConfig, RulesConfig, TbsConfig, DEFAULT_AREA_OFFSETS};
pub use error::{Result, RulesError};
pub use explain::{ApplyOutcome, Explanation, Step};
