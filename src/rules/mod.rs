//! The ruleset contract and the registry that hosts rulesets.
//!
//! Every game variant implements `Ruleset` over its own `GameState` type.
//! A host looks rulesets up by name in a `RulesetRegistry` and never
//! touches variant-specific types.

pub mod engine;
pub mod registry;

pub use engine::{state_mut, state_ref, GameState, Ruleset, Scheduler};
pub use registry::RulesetRegistry;
