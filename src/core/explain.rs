//! Explanations: the client-facing record of a legality decision.
//!
//! An `Explanation` lists the checks that ran (in order) and, when the action
//! is legal, the predicted outcome. `ApplyOutcome` is the matching result of
//! a mutating call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One check in a legality decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Check name, e.g. `basic_legality`.
    pub check: String,
    pub ok: bool,
    /// Extra detail for the check (reason, intermediate numbers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
}

/// Result of a dry-run legality check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub ok: bool,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub outcome: Map<String, Value>,
}

impl Explanation {
    /// An explanation with no steps yet.
    #[must_use]
    pub fn new(ok: bool) -> Self {
        Self {
            ok,
            steps: Vec::new(),
            outcome: Map::new(),
        }
    }

    /// Rejection carrying a `reason` in the outcome.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::new(false).with_outcome("reason", Value::String(reason.into()))
    }

    #[must_use]
    pub fn with_step(mut self, check: impl Into<String>, ok: bool) -> Self {
        self.steps.push(Step {
            check: check.into(),
            ok,
            info: None,
        });
        self
    }

    #[must_use]
    pub fn with_step_info(mut self, check: impl Into<String>, ok: bool, info: Value) -> Self {
        self.steps.push(Step {
            check: check.into(),
            ok,
            info: Some(info),
        });
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, key: impl Into<String>, value: Value) -> Self {
        self.outcome.insert(key.into(), value);
        self
    }

    /// The rejection reason, if one was recorded.
    pub fn reason(&self) -> Option<&str> {
        self.outcome.get("reason").and_then(Value::as_str)
    }

    /// Name of the first failing check.
    pub fn failed_check(&self) -> Option<&str> {
        self.steps.iter().find(|s| !s.ok).map(|s| s.check.as_str())
    }
}

/// Result of a mutating call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplyOutcome {
    #[must_use]
    pub const fn applied() -> Self {
        Self { ok: true, error: None }
    }

    pub fn refused(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}
