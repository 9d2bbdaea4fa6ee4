//! `Ruleset` adapter for the tactical battle engine.
//!
//! The host-facing state is a `TbsSession`. `apply` replaces the boxed
//! session with the successor value `TbsEngine::apply` produced, so a
//! caller holding a snapshot of the previous session keeps it unchanged.

use std::any::Any;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::action::TbsAction;
use super::demo;
use super::engine::TbsEngine;
use super::log::ActionLog;
use super::model::{Mission, MissionStatus, Side};
use super::session::TbsSession;
use crate::core::{ApplyOutcome, Explanation, Result, RulesError, TbsConfig};
use crate::rules::{state_mut, state_ref, GameState, Ruleset, Scheduler};

pub const TBS_RULESET: &str = "tbs";

/// Session id used when a payload does not carry one.
const DEFAULT_SESSION_ID: &str = "tbs";

impl GameState for TbsSession {
    fn ruleset(&self) -> &'static str {
        TBS_RULESET
    }

    fn to_serializable(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub struct TbsRuleset {
    engine: TbsEngine,
}

impl Default for TbsRuleset {
    fn default() -> Self {
        Self::new(TbsConfig::default())
    }
}

impl TbsRuleset {
    pub fn new(config: TbsConfig) -> Self {
        Self {
            engine: TbsEngine::new(config),
        }
    }

    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn ActionLog>) -> Self {
        self.engine = self.engine.with_log(log);
        self
    }

    pub fn engine(&self) -> &TbsEngine {
        &self.engine
    }

    /// Accepts either a whole session (`{"id", "mission"}`) or a bare mission.
    /// Missions that were never ordered are initialized.
    fn parse_session(&self, payload: &Value) -> Result<TbsSession> {
        let mut session = if payload.get("mission").is_some() {
            serde_json::from_value::<TbsSession>(payload.clone())
                .map_err(|e| RulesError::MalformedState(e.to_string()))?
        } else {
            let mission = serde_json::from_value::<Mission>(payload.clone())
                .map_err(|e| RulesError::MalformedState(e.to_string()))?;
            TbsSession::new(DEFAULT_SESSION_ID, mission)
        };
        if session.mission.initiative_order.is_empty() {
            self.engine.initialize_mission(&mut session.mission);
        }
        Ok(session)
    }
}

fn side_name(side: Side) -> Value {
    serde_json::to_value(side).unwrap_or(Value::Null)
}

fn winner(status: MissionStatus) -> Value {
    match status {
        MissionStatus::Victory => side_name(Side::Player),
        MissionStatus::Defeat => side_name(Side::Enemy),
        MissionStatus::InProgress => Value::Null,
    }
}

impl Ruleset for TbsRuleset {
    fn name(&self) -> &'static str {
        TBS_RULESET
    }

    fn scheduler(&self) -> Scheduler {
        Scheduler::UnitInitiative
    }

    fn create(&self, payload: Option<&Value>) -> Result<Box<dyn GameState>> {
        let session = match payload {
            Some(p) if !p.is_null() => self.parse_session(p)?,
            _ => demo::demo_session(DEFAULT_SESSION_ID, &self.engine),
        };
        debug!(session = %session.id, mission = %session.mission.id, "tbs session created");
        Ok(Box::new(session))
    }

    fn evaluate(&self, state: &dyn GameState, action: &Value) -> Result<Explanation> {
        let session = state_ref::<TbsSession>(state, TBS_RULESET)?;
        let action = TbsAction::from_value(action)?;
        let verdict = self.engine.evaluate(session, &action);
        let check = format!("{}_rules", action.kind().to_ascii_lowercase());

        if !verdict.legal {
            return Ok(Explanation::rejected(verdict.explanation.clone()).with_step_info(
                check,
                false,
                json!({ "reason": verdict.explanation }),
            ));
        }

        let mut explanation = Explanation::new(true)
            .with_step_info(check, true, json!({ "explanation": verdict.explanation }))
            .with_outcome("explanation", Value::String(verdict.explanation));
        if let TbsAction::Attack(a) = &action {
            if let Some(eval) = self.engine.evaluate_attack(&session.mission, &a.attacker_id, &a.target_id) {
                explanation = explanation.with_outcome("attack_evaluation", serde_json::to_value(eval)?);
            }
        }
        Ok(explanation)
    }

    fn apply(&self, state: &mut dyn GameState, action: &Value) -> Result<ApplyOutcome> {
        let session = state_mut::<TbsSession>(state, TBS_RULESET)?;
        let action = TbsAction::from_value(action)?;
        let processed = self.engine.process_action(session, &action)?;
        match processed.session {
            Some(next) => {
                *session = next;
                Ok(ApplyOutcome::applied())
            }
            None => Ok(ApplyOutcome::refused(processed.verdict.explanation)),
        }
    }

    fn summarize(&self, state: &dyn GameState) -> Result<Value> {
        let mission = &state_ref::<TbsSession>(state, TBS_RULESET)?.mission;
        Ok(json!({
            "status": mission.status,
            "turn": mission.turn,
            "current_unit_id": mission.current_unit_id,
            "side_to_move": mission.side_to_move,
            "winner": winner(mission.status),
        }))
    }

    fn legal_actions(&self, state: &dyn GameState, explain: bool) -> Result<Vec<Value>> {
        let session = state_ref::<TbsSession>(state, TBS_RULESET)?;
        self.engine
            .list_legal_actions(session, explain)
            .into_iter()
            .map(|la| Ok(serde_json::to_value(la)?))
            .collect()
    }

    fn info(&self, state: &dyn GameState) -> Result<Value> {
        let session = state_ref::<TbsSession>(state, TBS_RULESET)?;

        // First legal payload of each kind doubles as an example.
        let mut examples = Map::new();
        for la in self.engine.list_legal_actions(session, false) {
            let kind = la.action.kind();
            if !examples.contains_key(kind) {
                examples.insert(kind.to_string(), serde_json::to_value(&la.action)?);
            }
        }
        let actions: Map<String, Value> = ["MOVE", "ATTACK", "USE_SKILL", "END_TURN"]
            .into_iter()
            .map(|kind| {
                let example = examples.get(kind).cloned().unwrap_or(Value::Null);
                (kind.to_string(), json!({ "example": example }))
            })
            .collect();

        Ok(json!({
            "ruleset": TBS_RULESET,
            "scheduler": self.scheduler(),
            "map": session.mission.map,
            "defaults": self.engine.config(),
            "actions": actions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tbs::model::{Coord, Goal, MapGrid, StatName, Unit};

    fn duel() -> Value {
        let mission = Mission::new("m", "Duel", MapGrid::new(3, 3))
            .with_unit(
                Unit::new("p", Side::Player, "P", Coord::new(0, 0))
                    .with_stat(StatName::Atk, 20)
                    .with_stat(StatName::Init, 20),
            )
            .with_unit(Unit::new("e", Side::Enemy, "E", Coord::new(1, 0)))
            .with_goal(Goal::eliminate_all_enemies());
        serde_json::to_value(mission).unwrap()
    }

    #[test]
    fn test_create_demo_by_default() {
        let rules = TbsRuleset::default();
        let state = rules.create(None).unwrap();
        assert_eq!(state.ruleset(), "tbs");
        let summary = rules.summarize(state.as_ref()).unwrap();
        assert_eq!(summary["status"], "IN_PROGRESS");
        assert_eq!(summary["current_unit_id"], "u.fighter");
        assert_eq!(summary["turn"], 1);
        assert!(summary["winner"].is_null());
    }

    #[test]
    fn test_create_from_mission_initializes() {
        let rules = TbsRuleset::default();
        let state = rules.create(Some(&duel())).unwrap();
        let session = state_ref::<TbsSession>(state.as_ref(), TBS_RULESET).unwrap();
        assert_eq!(session.mission.initiative_order, vec!["p", "e"]);
        assert_eq!(session.mission.unit("p").unwrap().ap_left, 2);
    }

    #[test]
    fn test_create_rejects_garbage() {
        let err = TbsRuleset::default().create(Some(&json!({"id": 3}))).err().unwrap();
        assert_eq!(err.code(), "MALFORMED_STATE");
    }

    #[test]
    fn test_evaluate_explains_rejection() {
        let rules = TbsRuleset::default();
        let state = rules.create(Some(&duel())).unwrap();
        let e = rules
            .evaluate(state.as_ref(), &json!({"kind": "MOVE", "unit_id": "e", "to": [2, 0]}))
            .unwrap();
        assert!(!e.ok);
        assert_eq!(e.reason(), Some("unit cannot act"));
        assert_eq!(e.failed_check(), Some("move_rules"));
    }

    #[test]
    fn test_evaluate_attack_carries_breakdown() {
        let rules = TbsRuleset::default();
        let state = rules.create(Some(&duel())).unwrap();
        let e = rules
            .evaluate(state.as_ref(), &json!({"kind": "ATTACK", "attacker_id": "p", "target_id": "e"}))
            .unwrap();
        assert!(e.ok);
        assert!(e.outcome.contains_key("attack_evaluation"));
    }

    #[test]
    fn test_apply_and_win() {
        let rules = TbsRuleset::default();
        let mut state = rules.create(Some(&duel())).unwrap();
        let out = rules
            .apply(state.as_mut(), &json!({"kind": "ATTACK", "attacker_id": "p", "target_id": "e"}))
            .unwrap();
        assert!(out.ok);
        let summary = rules.summarize(state.as_ref()).unwrap();
        assert_eq!(summary["status"], "VICTORY");
        assert_eq!(summary["winner"], "PLAYER");
    }

    #[test]
    fn test_apply_refusal_keeps_state() {
        let rules = TbsRuleset::default();
        let mut state = rules.create(Some(&duel())).unwrap();
        let before = state.to_serializable().unwrap();
        let out = rules
            .apply(state.as_mut(), &json!({"kind": "MOVE", "unit_id": "p", "to": [1, 0]}))
            .unwrap();
        assert!(!out.ok);
        assert_eq!(out.error.as_deref(), Some("destination occupied"));
        assert_eq!(state.to_serializable().unwrap(), before);
    }

    #[test]
    fn test_malformed_action() {
        let rules = TbsRuleset::default();
        let state = rules.create(None).unwrap();
        let err = rules.evaluate(state.as_ref(), &json!({"kind": "DANCE"})).unwrap_err();
        assert_eq!(err.code(), "MALFORMED_ACTION");
    }

    #[test]
    fn test_session_round_trips_through_create() {
        let rules = TbsRuleset::default();
        let mut state = rules.create(None).unwrap();
        rules.apply(state.as_mut(), &json!({"kind": "END_TURN"})).unwrap();
        let saved = state.to_serializable().unwrap();
        let restored = rules.create(Some(&saved)).unwrap();
        assert_eq!(restored.to_serializable().unwrap(), saved);
        assert_eq!(rules.summarize(restored.as_ref()).unwrap()["current_unit_id"], "u.mage");
    }

    #[test]
    fn test_info_lists_examples() {
        let rules = TbsRuleset::default();
        let state = rules.create(None).unwrap();
        let info = rules.info(state.as_ref()).unwrap();
        assert_eq!(info["ruleset"], "tbs");
        assert_eq!(info["scheduler"], "unit_initiative");
        assert_eq!(info["actions"]["END_TURN"]["example"]["kind"], "END_TURN");
        assert_eq!(info["actions"]["MOVE"]["example"]["unit_id"], "u.fighter");
        assert_eq!(info["defaults"]["crit_threshold"], 100);
    }
}
