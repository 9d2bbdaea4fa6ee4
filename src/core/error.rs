//! Error types for the rules engine.
//!
//! Domain rejections (an illegal move, a unit out of AP) are *values*:
//! they come back as `Verdict`, `Explanation` or `ApplyOutcome`. `RulesError`
//! is reserved for caller defects: unknown rulesets, payloads that do not
//! parse, states handed to the wrong ruleset, or an `apply` submitted for an
//! action that does not pass its own evaluation.

use thiserror::Error;

/// Errors raised by the rules engine.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("unknown ruleset: {0}")]
    UnknownRuleset(String),

    #[error("state does not belong to ruleset '{expected}'")]
    StateMismatch { expected: &'static str },

    #[error("malformed action: {0}")]
    MalformedAction(String),

    #[error("malformed state: {0}")]
    MalformedState(String),

    #[error("illegal action: {reason}")]
    IllegalAction { reason: String },

    #[error("ruleset '{ruleset}' does not support {operation}")]
    Unsupported {
        ruleset: &'static str,
        operation: &'static str,
    },

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl RulesError {
    /// Build an `IllegalAction` from any reason string.
    pub fn illegal(reason: impl Into<String>) -> Self {
        RulesError::IllegalAction {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code, for transport layers.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            RulesError::UnknownRuleset(_) => "UNKNOWN_RULESET",
            RulesError::StateMismatch { .. } => "STATE_MISMATCH",
            RulesError::MalformedAction(_) => "MALFORMED_ACTION",
            RulesError::MalformedState(_) => "MALFORMED_STATE",
            RulesError::IllegalAction { .. } => "ILLEGAL_ACTION",
            RulesError::Unsupported { .. } => "UNSUPPORTED",
            RulesError::InvalidSquare(_) => "INVALID_SQUARE",
            RulesError::InvalidFen(_) => "INVALID_FEN",
            RulesError::Json(_) => "JSON",
            RulesError::Snapshot(_) => "SNAPSHOT",
            RulesError::Config(_) => "CONFIG",
        }
    }

    /// True when the error signals a bad request rather than a broken engine.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        !matches!(self, RulesError::Snapshot(_))
    }
}

pub type Result<T> = std::result::Result<T, RulesError>;
