//! Action log sinks.
//!
//! The engine reports every processed submission as an `ActionLogEntry`.
//! Where entries go is the caller's choice:
//! - `TracingLog` (default) emits one `tracing` event per entry
//! - `MemoryLog` keeps entries in memory, for tests and replays

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::action::TbsAction;
use super::combat::AttackEvaluation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogResult {
    Applied,
    Illegal,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub session_id: String,
    pub turn: u32,
    pub actor_unit_id: Option<String>,
    pub action: TbsAction,
    pub result: LogResult,
    pub message: String,
    /// Breakdown of an applied attack.
    #[serde(default)]
    pub attack_eval: Option<AttackEvaluation>,
}

/// Destination for action log entries.
pub trait ActionLog: Send + Sync {
    fn record(&self, entry: ActionLogEntry);
}

/// Forwards entries to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl ActionLog for TracingLog {
    fn record(&self, entry: ActionLogEntry) {
        match entry.result {
            LogResult::Applied => info!(
                session = %entry.session_id,
                turn = entry.turn,
                actor = entry.actor_unit_id.as_deref().unwrap_or("-"),
                kind = entry.action.kind(),
                message = %entry.message,
                "action applied"
            ),
            LogResult::Illegal | LogResult::Error => warn!(
                session = %entry.session_id,
                turn = entry.turn,
                actor = entry.actor_unit_id.as_deref().unwrap_or("-"),
                kind = entry.action.kind(),
                result = ?entry.result,
                message = %entry.message,
                "action rejected"
            ),
        }
    }
}

/// Collects entries in order.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<ActionLogEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<ActionLogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActionLog for MemoryLog {
    fn record(&self, entry: ActionLogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}
