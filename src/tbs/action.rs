//! Tactical battle actions.
//!
//! Actions form a closed set. On the wire they are tagged by `kind`:
//!
//! ```
//! use rust_rulesets::tbs::TbsAction;
//!
//! let action: TbsAction =
//!     serde_json::from_str(r#"{"kind":"MOVE","unit_id":"u.fighter","to":[2,1]}"#).unwrap();
//! assert_eq!(action.actor(), Some("u.fighter"));
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::model::Coord;
use crate::core::{Result, RulesError};

/// Area offsets for tile-targeted skills. Most shapes fit inline.
pub type AreaOffsets = SmallVec<[Coord; 9]>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAction {
    pub unit_id: String,
    pub to: Coord,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackAction {
    pub attacker_id: String,
    pub target_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseSkillAction {
    pub unit_id: String,
    pub skill_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_unit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_tile: Option<Coord>,
    /// Overrides the default AoE footprint, relative to `target_tile`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_offsets: Option<AreaOffsets>,
}

impl UseSkillAction {
    pub fn new(unit_id: impl Into<String>, skill_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            skill_id: skill_id.into(),
            target_unit_id: None,
            target_tile: None,
            area_offsets: None,
        }
    }

    #[must_use]
    pub fn on_unit(mut self, target: impl Into<String>) -> Self {
        self.target_unit_id = Some(target.into());
        self
    }

    #[must_use]
    pub fn on_tile(mut self, tile: Coord) -> Self {
        self.target_tile = Some(tile);
        self
    }

    #[must_use]
    pub fn with_area(mut self, offsets: impl IntoIterator<Item = (i32, i32)>) -> Self {
        self.area_offsets = Some(offsets.into_iter().map(Coord::from).collect());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TbsAction {
    Move(MoveAction),
    Attack(AttackAction),
    UseSkill(UseSkillAction),
    EndTurn,
}

impl TbsAction {
    pub fn move_to(unit_id: impl Into<String>, to: Coord) -> Self {
        TbsAction::Move(MoveAction {
            unit_id: unit_id.into(),
            to,
        })
    }

    pub fn attack(attacker_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        TbsAction::Attack(AttackAction {
            attacker_id: attacker_id.into(),
            target_id: target_id.into(),
        })
    }

    /// Parse a raw payload. Unknown kinds and missing fields are rejected.
    pub fn from_value(raw: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(raw.clone()).map_err(|e| RulesError::MalformedAction(e.to_string()))
    }

    /// Wire name of the action kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            TbsAction::Move(_) => "MOVE",
            TbsAction::Attack(_) => "ATTACK",
            TbsAction::UseSkill(_) => "USE_SKILL",
            TbsAction::EndTurn => "END_TURN",
        }
    }

    /// The acting unit, if the action names one.
    pub fn actor(&self) -> Option<&str> {
        match self {
            TbsAction::Move(a) => Some(&a.unit_id),
            TbsAction::Attack(a) => Some(&a.attacker_id),
            TbsAction::UseSkill(a) => Some(&a.unit_id),
            TbsAction::EndTurn => None,
        }
    }
}

impl From<UseSkillAction> for TbsAction {
    fn from(action: UseSkillAction) -> Self {
        TbsAction::UseSkill(action)
    }
}
