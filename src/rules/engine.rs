//! The ruleset contract.
//!
//! A host (session store, HTTP layer, test harness) drives every game
//! variant through the same four calls:
//!
//! - `create`: build a fresh state, optionally from a JSON payload
//! - `evaluate`: dry-run an action and explain the decision
//! - `apply`: perform an action, mutating the state in place
//! - `summarize`: report status, winner and whose turn it is
//!
//! States travel as `Box<dyn GameState>`. A ruleset downcasts them back to
//! its concrete type with [`state_ref`] / [`state_mut`]; handing a state to
//! the wrong ruleset is a `StateMismatch` error, not a panic.
//!
//! ## Errors vs. rejections
//!
//! An illegal action is a value (`Explanation { ok: false, .. }` or
//! `ApplyOutcome { ok: false, .. }`). `Err` is reserved for payloads that do
//! not parse and for states of the wrong type.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{ApplyOutcome, Explanation, Result, RulesError};

/// How a ruleset decides who acts next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheduler {
    /// One unit at a time, ordered by initiative.
    UnitInitiative,
    /// Sides alternate.
    SideToMove,
}

impl Scheduler {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Scheduler::UnitInitiative => "unit_initiative",
            Scheduler::SideToMove => "side_to_move",
        }
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ruleset-owned game state, type-erased for the host.
pub trait GameState: Send + Sync + fmt::Debug {
    /// Name of the ruleset that owns this state.
    fn ruleset(&self) -> &'static str;

    /// JSON form that `Ruleset::create` accepts back.
    fn to_serializable(&self) -> Result<Value>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A game variant.
///
/// Implementations hold configuration only; all game data lives in the
/// `GameState` passed to each call.
pub trait Ruleset: Send + Sync {
    /// Registry key, e.g. `"tbs"` or `"chess"`.
    fn name(&self) -> &'static str;

    fn scheduler(&self) -> Scheduler;

    /// Build a state. `None` yields the ruleset's stock starting position.
    fn create(&self, payload: Option<&Value>) -> Result<Box<dyn GameState>>;

    /// Dry-run `action` against `state`.
    fn evaluate(&self, state: &dyn GameState, action: &Value) -> Result<Explanation>;

    /// Perform `action`. On refusal the state is left untouched.
    fn apply(&self, state: &mut dyn GameState, action: &Value) -> Result<ApplyOutcome>;

    /// Status snapshot: whose turn, terminal status, winner.
    fn summarize(&self, state: &dyn GameState) -> Result<Value>;

    /// Every legal action payload for the side or unit to act.
    fn legal_actions(&self, _state: &dyn GameState, _explain: bool) -> Result<Vec<Value>> {
        Err(RulesError::Unsupported {
            ruleset: self.name(),
            operation: "legal_actions",
        })
    }

    /// Client-facing description of the ruleset: action kinds, example
    /// payloads and defaults.
    fn info(&self, state: &dyn GameState) -> Result<Value>;
}

/// Downcast a state to the concrete type owned by ruleset `expected`.
pub fn state_ref<'a, T: Any>(state: &'a dyn GameState, expected: &'static str) -> Result<&'a T> {
    state
        .as_any()
        .downcast_ref::<T>()
        .ok_or(RulesError::StateMismatch { expected })
}

/// Mutable counterpart of [`state_ref`].
pub fn state_mut<'a, T: Any>(state: &'a mut dyn GameState, expected: &'static str) -> Result<&'a mut T> {
    state
        .as_any_mut()
        .downcast_mut::<T>()
        .ok_or(RulesError::StateMismatch { expected })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counter(u32);

    impl GameState for Counter {
        fn ruleset(&self) -> &'static str {
            "counter"
        }

        fn to_serializable(&self) -> Result<Value> {
            Ok(Value::from(self.0))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Other;

    impl GameState for Other {
        fn ruleset(&self) -> &'static str {
            "other"
        }

        fn to_serializable(&self) -> Result<Value> {
            Ok(Value::Null)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct CounterRules;

    impl Ruleset for CounterRules {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn scheduler(&self) -> Scheduler {
            Scheduler::SideToMove
        }

        fn create(&self, _payload: Option<&Value>) -> Result<Box<dyn GameState>> {
            Ok(Box::new(Counter(0)))
        }

        fn evaluate(&self, state: &dyn GameState, _action: &Value) -> Result<Explanation> {
            state_ref::<Counter>(state, "counter")?;
            Ok(Explanation::new(true))
        }

        fn apply(&self, state: &mut dyn GameState, _action: &Value) -> Result<ApplyOutcome> {
            state_mut::<Counter>(state, "counter")?.0 += 1;
            Ok(ApplyOutcome::applied())
        }

        fn summarize(&self, state: &dyn GameState) -> Result<Value> {
            state.to_serializable()
        }

        fn info(&self, _state: &dyn GameState) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn test_downcast_and_mutate() {
        let rules = CounterRules;
        let mut state = rules.create(None).unwrap();
        rules.apply(state.as_mut(), &Value::Null).unwrap();
        rules.apply(state.as_mut(), &Value::Null).unwrap();
        assert_eq!(rules.summarize(state.as_ref()).unwrap(), Value::from(2));
    }

    #[test]
    fn test_wrong_state_is_mismatch() {
        let rules = CounterRules;
        let err = rules.evaluate(&Other, &Value::Null).unwrap_err();
        assert!(matches!(err, RulesError::StateMismatch { expected: "counter" }));
    }

    #[test]
    fn test_legal_actions_default_unsupported() {
        let rules = CounterRules;
        let state = rules.create(None).unwrap();
        let err = rules.legal_actions(state.as_ref(), false).unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED");
    }

    #[test]
    fn test_scheduler_wire_names() {
        assert_eq!(serde_json::to_value(Scheduler::SideToMove).unwrap(), "side_to_move");
        assert_eq!(Scheduler::UnitInitiative.to_string(), "unit_initiative");
    }
}
