//! Ruleset registry.
//!
//! The registry is the application context a host builds once at startup
//! and passes around; there is no global table. Lookups are by name.
//!
//! ```
//! use rust_rulesets::core::RulesConfig;
//! use rust_rulesets::rules::{RulesetRegistry, Scheduler};
//!
//! let registry = RulesetRegistry::with_defaults(&RulesConfig::default());
//! let chess = registry.get("chess").unwrap();
//! assert_eq!(chess.scheduler(), Scheduler::SideToMove);
//! assert!(registry.get("go").is_err());
//! ```

use rustc_hash::FxHashMap;
use tracing::debug;

use super::engine::{Ruleset, Scheduler};
use crate::chess::ChessRuleset;
use crate::core::{Result, RulesConfig, RulesError};
use crate::tbs::TbsRuleset;

#[derive(Default)]
pub struct RulesetRegistry {
    rulesets: FxHashMap<&'static str, Box<dyn Ruleset>>,
}

impl RulesetRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the stock `tbs` and `chess` rulesets.
    #[must_use]
    pub fn with_defaults(config: &RulesConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TbsRuleset::new(config.tbs.clone())));
        registry.register(Box::new(ChessRuleset::new(config.chess.clone())));
        registry
    }

    /// Add a ruleset under its own name, returning any ruleset it replaced.
    pub fn register(&mut self, ruleset: Box<dyn Ruleset>) -> Option<Box<dyn Ruleset>> {
        let name = ruleset.name();
        debug!(ruleset = name, scheduler = %ruleset.scheduler(), "registering ruleset");
        self.rulesets.insert(name, ruleset)
    }

    pub fn get(&self, name: &str) -> Result<&dyn Ruleset> {
        self.rulesets
            .get(name)
            .map(|r| r.as_ref())
            .ok_or_else(|| RulesError::UnknownRuleset(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rulesets.contains_key(name)
    }

    /// Registered names with their schedulers, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<(&'static str, Scheduler)> {
        let mut out: Vec<_> = self.rulesets.iter().map(|(name, r)| (*name, r.scheduler())).collect();
        out.sort_unstable_by_key(|(name, _)| *name);
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rulesets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rulesets.is_empty()
    }
}
