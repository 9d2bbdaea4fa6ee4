//! Per-action legality checks and state transitions.
//!
//! Each handler module exposes the same pair:
//! - `evaluate(&Mission, &A, &TbsConfig) -> Verdict`: pure, never panics on
//!   unknown ids; every failed precondition becomes a reason string.
//! - `apply(&mut Mission, &A, &TbsConfig)`: performs the transition. Only
//!   called after `evaluate` said yes.
//!
//! `evaluate`/`apply` below dispatch over the closed `TbsAction` set with an
//! exhaustive match, so adding an action kind is a compile error until every
//! handler path covers it.

pub mod attack;
pub mod end_turn;
pub mod movement;
pub mod skill;

use serde::{Deserialize, Serialize};

use super::action::TbsAction;
use super::model::{Mission, Unit};
use crate::core::TbsConfig;

/// Outcome of a TBS legality check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub legal: bool,
    pub explanation: String,
}

impl Verdict {
    #[must_use]
    pub fn ok() -> Self {
        Self::ok_with("ok")
    }

    pub fn ok_with(explanation: impl Into<String>) -> Self {
        Self {
            legal: true,
            explanation: explanation.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            legal: false,
            explanation: reason.into(),
        }
    }
}

/// A unit may act iff it is alive and holds the initiative cursor.
pub(crate) fn can_act(mission: &Mission, unit: &Unit) -> bool {
    unit.alive && mission.current_unit_id.as_deref() == Some(unit.id.as_str())
}

pub fn evaluate(mission: &Mission, action: &TbsAction, config: &TbsConfig) -> Verdict {
    match action {
        TbsAction::Move(a) => movement::evaluate(mission, a, config),
        TbsAction::Attack(a) => attack::evaluate(mission, a, config),
        TbsAction::UseSkill(a) => skill::evaluate(mission, a, config),
        TbsAction::EndTurn => end_turn::evaluate(mission),
    }
}

pub(crate) fn apply(mission: &mut Mission, action: &TbsAction, config: &TbsConfig) {
    match action {
        TbsAction::Move(a) => movement::apply(mission, a, config),
        TbsAction::Attack(a) => attack::apply(mission, a, config),
        TbsAction::UseSkill(a) => skill::apply(mission, a, config),
        TbsAction::EndTurn => end_turn::apply(mission),
    }
}
