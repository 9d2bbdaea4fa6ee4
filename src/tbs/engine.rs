//! The tactical battle engine.
//!
//! `TbsEngine` is the public face of the battle rules. It owns a
//! `TbsConfig` and an action log sink; it holds no game state. Every call
//! takes the session it works on.
//!
//! ## Flow
//!
//! ```text
//! evaluate ──► Verdict (pure)
//! apply ─────► re-evaluate ─► handler ─► victory check ─► new session
//! process_action = evaluate + apply + logging
//! ```
//!
//! Enumeration (`list_legal_actions`) runs every candidate through the same
//! `evaluate`, so what is listed is exactly what `apply` accepts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::action::{TbsAction, UseSkillAction};
use super::combat::{self, AttackEvaluation};
use super::handlers::{self, Verdict};
use super::log::{ActionLog, ActionLogEntry, LogResult, TracingLog};
use super::model::{Mission, MissionStatus, SkillKind, SkillTarget, StatName};
use super::session::TbsSession;
use super::{reach, stats, turn, victory};
use crate::core::{Result, RulesError, TbsConfig};

/// A legal action with its explanation and, on request, an attack breakdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegalAction {
    pub action: TbsAction,
    pub explanation: String,
    #[serde(default)]
    pub evaluation: Option<AttackEvaluation>,
}

/// Result of `process_action`. `session` is `None` when the action was
/// rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct Processed {
    pub verdict: Verdict,
    pub session: Option<TbsSession>,
}

pub struct TbsEngine {
    config: TbsConfig,
    log: Arc<dyn ActionLog>,
}

impl Default for TbsEngine {
    fn default() -> Self {
        Self::new(TbsConfig::default())
    }
}

impl TbsEngine {
    pub fn new(config: TbsConfig) -> Self {
        Self {
            config,
            log: Arc::new(TracingLog),
        }
    }

    /// Route log entries to `log` instead of `tracing`.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn ActionLog>) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &TbsConfig {
        &self.config
    }

    /// Order units, record max-HP caps and prime the first actor.
    pub fn initialize_mission(&self, mission: &mut Mission) {
        turn::initialize(mission);
    }

    /// Dry-run legality check.
    pub fn evaluate(&self, session: &TbsSession, action: &TbsAction) -> Verdict {
        evaluate_in(&session.mission, action, &self.config)
    }

    /// Apply a legal action, returning the successor session.
    ///
    /// Legality is re-derived first; an action that does not pass its own
    /// evaluation is a caller error.
    pub fn apply(&self, session: &TbsSession, action: &TbsAction) -> Result<TbsSession> {
        let verdict = self.evaluate(session, action);
        if !verdict.legal {
            return Err(RulesError::illegal(verdict.explanation));
        }

        let mut mission = session.mission.clone();
        handlers::apply(&mut mission, action, &self.config);
        let status = victory::check(&mission);
        if status != mission.status {
            info!(session = %session.id, ?status, "mission status changed");
        }
        mission.status = status;
        Ok(session.with_mission(mission))
    }

    /// Evaluate, apply if legal, and report to the log sink.
    pub fn process_action(&self, session: &TbsSession, action: &TbsAction) -> Result<Processed> {
        let verdict = self.evaluate(session, action);
        if !verdict.legal {
            self.record(session, action, LogResult::Illegal, &verdict.explanation, None);
            return Ok(Processed {
                verdict,
                session: None,
            });
        }

        match self.apply(session, action) {
            Ok(next) => {
                // Breakdown of the resolved attack, read from the successor state.
                let attack_eval = match action {
                    TbsAction::Attack(a) => self.evaluate_attack(&next.mission, &a.attacker_id, &a.target_id),
                    _ => None,
                };
                self.record(&next, action, LogResult::Applied, &verdict.explanation, attack_eval);
                Ok(Processed {
                    verdict,
                    session: Some(next),
                })
            }
            Err(err) => {
                self.record(session, action, LogResult::Error, &err.to_string(), None);
                Err(err)
            }
        }
    }

    /// Current outcome of the session's mission.
    pub fn check_victory_conditions(&self, session: &TbsSession) -> MissionStatus {
        victory::check(&session.mission)
    }

    pub fn evaluate_attack(&self, mission: &Mission, attacker_id: &str, target_id: &str) -> Option<AttackEvaluation> {
        combat::evaluate_attack(mission, attacker_id, target_id, &self.config)
    }

    /// Every legal action for the unit holding the initiative.
    ///
    /// END_TURN comes first, then moves (row-major), attacks, and skills in
    /// the unit's skill order.
    pub fn list_legal_actions(&self, session: &TbsSession, explain: bool) -> Vec<LegalAction> {
        let mission = &session.mission;
        let mut out = Vec::new();
        if mission.status.is_terminal() {
            return out;
        }
        let Some(unit) = mission.current_unit() else {
            return out;
        };

        self.push_if_legal(mission, TbsAction::EndTurn, None, &mut out);

        if unit.ap_left >= self.config.move_ap_cost {
            for dest in reach::reachable_sorted(mission, unit) {
                if dest != unit.pos {
                    self.push_if_legal(mission, TbsAction::move_to(&unit.id, dest), None, &mut out);
                }
            }
        }

        if unit.ap_left >= self.config.attack_ap_cost {
            let rng = stats::effective(mission, unit, StatName::Rng);
            for other in mission.living_units() {
                if other.id == unit.id || !reach::in_range(unit.pos, other.pos, rng) {
                    continue;
                }
                let evaluation = if explain {
                    self.evaluate_attack(mission, &unit.id, &other.id)
                } else {
                    None
                };
                self.push_if_legal(mission, TbsAction::attack(&unit.id, &other.id), evaluation, &mut out);
            }
        }

        for skill in &unit.skills {
            if skill.kind == SkillKind::Passive || !unit.skill_ready(skill) {
                continue;
            }
            let base = UseSkillAction::new(&unit.id, &skill.id);
            match skill.target {
                SkillTarget::SelfUnit | SkillTarget::NoTarget => {
                    self.push_if_legal(mission, base.into(), None, &mut out);
                }
                SkillTarget::AllyUnit | SkillTarget::EnemyUnit => {
                    let want_ally = skill.target == SkillTarget::AllyUnit;
                    for other in mission.living_units() {
                        if (other.side == unit.side) != want_ally
                            || !reach::in_range(unit.pos, other.pos, skill.range)
                        {
                            continue;
                        }
                        self.push_if_legal(mission, base.clone().on_unit(&other.id).into(), None, &mut out);
                    }
                }
                SkillTarget::Tile => {
                    for tile in reach::diamond(&mission.map, unit.pos, skill.range) {
                        self.push_if_legal(mission, base.clone().on_tile(tile).into(), None, &mut out);
                    }
                }
            }
        }
        out
    }

    fn push_if_legal(
        &self,
        mission: &Mission,
        action: TbsAction,
        evaluation: Option<AttackEvaluation>,
        out: &mut Vec<LegalAction>,
    ) {
        let verdict = evaluate_in(mission, &action, &self.config);
        if verdict.legal {
            out.push(LegalAction {
                action,
                explanation: verdict.explanation,
                evaluation,
            });
        }
    }

    fn record(
        &self,
        session: &TbsSession,
        action: &TbsAction,
        result: LogResult,
        message: &str,
        attack_eval: Option<AttackEvaluation>,
    ) {
        self.log.record(ActionLogEntry {
            session_id: session.id.clone(),
            turn: session.mission.turn,
            actor_unit_id: action.actor().map(str::to_string),
            action: action.clone(),
            result,
            message: message.to_string(),
            attack_eval,
        });
    }
}

fn evaluate_in(mission: &Mission, action: &TbsAction, config: &TbsConfig) -> Verdict {
    if mission.status.is_terminal() {
        return Verdict::deny("mission is over");
    }
    handlers::evaluate(mission, action, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tbs::log::MemoryLog;
    use crate::tbs::model::{Coord, Goal, MapGrid, Side, Skill, StatModifier, Unit};

    fn session() -> TbsSession {
        let mut mission = Mission::new("m", "M", MapGrid::new(4, 4))
            .with_unit(
                Unit::new("p", Side::Player, "P", Coord::new(0, 0))
                    .with_stat(StatName::Atk, 10)
                    .with_stat(StatName::Init, 20),
            )
            .with_unit(Unit::new("e", Side::Enemy, "E", Coord::new(1, 0)).with_stat(StatName::Hp, 5))
            .with_goal(Goal::eliminate_all_enemies());
        TbsEngine::default().initialize_mission(&mut mission);
        TbsSession::new("s1", mission)
    }

    #[test]
    fn test_apply_returns_new_session() {
        let engine = TbsEngine::default();
        let s = session();
        let next = engine.apply(&s, &TbsAction::move_to("p", Coord::new(0, 1))).unwrap();
        assert_eq!(s.mission.unit("p").unwrap().pos, Coord::new(0, 0));
        assert_eq!(next.mission.unit("p").unwrap().pos, Coord::new(0, 1));
        assert_eq!(next.id, "s1");
    }

    #[test]
    fn test_apply_refuses_illegal() {
        let engine = TbsEngine::default();
        let err = engine
            .apply(&session(), &TbsAction::move_to("e", Coord::new(2, 0)))
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalAction { ref reason } if reason == "unit cannot act"));
    }

    #[test]
    fn test_kill_sets_victory_and_freezes() {
        let engine = TbsEngine::default();
        let next = engine.apply(&session(), &TbsAction::attack("p", "e")).unwrap();
        assert_eq!(next.mission.status, MissionStatus::Victory);
        assert_eq!(engine.check_victory_conditions(&next), MissionStatus::Victory);
        assert_eq!(engine.evaluate(&next, &TbsAction::EndTurn).explanation, "mission is over");
        assert!(engine.list_legal_actions(&next, false).is_empty());
    }

    #[test]
    fn test_process_action_logs() {
        let log = Arc::new(MemoryLog::new());
        let engine = TbsEngine::default().with_log(log.clone());
        let s = session();

        let rejected = engine.process_action(&s, &TbsAction::attack("e", "p")).unwrap();
        assert!(rejected.session.is_none());

        let done = engine.process_action(&s, &TbsAction::attack("p", "e")).unwrap();
        assert!(done.session.is_some());

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].result, LogResult::Illegal);
        assert_eq!(entries[0].message, "attacker cannot act");
        assert_eq!(entries[1].result, LogResult::Applied);
        assert_eq!(entries[1].actor_unit_id.as_deref(), Some("p"));
        assert_eq!(
            entries[1].attack_eval,
            engine.evaluate_attack(&done.session.unwrap().mission, "p", "e")
        );
        assert!(entries[1].attack_eval.is_some());
    }

    #[test]
    fn test_enumeration_honours_ap_costs() {
        let s = session();
        let kinds = |engine: &TbsEngine| -> Vec<&'static str> {
            engine.list_legal_actions(&s, false).iter().map(|la| la.action.kind()).collect()
        };
        let costly_attack = TbsEngine::new(TbsConfig::default().with_ap_costs(1, 3));
        assert!(kinds(&costly_attack).contains(&"MOVE"));
        assert!(!kinds(&costly_attack).contains(&"ATTACK"));

        let costly_move = TbsEngine::new(TbsConfig::default().with_ap_costs(3, 1));
        assert!(!kinds(&costly_move).contains(&"MOVE"));
        assert!(kinds(&costly_move).contains(&"ATTACK"));
    }

    #[test]
    fn test_long_range_tile_skill_enumerates_map_only() {
        let sniper = Unit::new("p", Side::Player, "P", Coord::new(0, 0)).with_skill(
            Skill::active("barrage", "Barrage")
                .with_range(i32::MAX)
                .with_target(SkillTarget::Tile)
                .with_apply_mod(StatModifier::additive(StatName::Hp, -1)),
        );
        let mut mission = Mission::new("m", "M", MapGrid::new(3, 3)).with_unit(sniper);
        TbsEngine::default().initialize_mission(&mut mission);
        let s = TbsSession::new("s", mission);

        let tiles = TbsEngine::default()
            .list_legal_actions(&s, false)
            .into_iter()
            .filter(|la| la.action.kind() == "USE_SKILL")
            .count();
        assert_eq!(tiles, 9);
    }

    #[test]
    fn test_enumeration_matches_evaluate() {
        let engine = TbsEngine::default();
        let s = session();
        let actions = engine.list_legal_actions(&s, true);
        assert_eq!(actions[0].action, TbsAction::EndTurn);
        for la in &actions {
            assert!(engine.evaluate(&s, &la.action).legal);
        }
        let attack = actions
            .iter()
            .find(|la| matches!(la.action, TbsAction::Attack(_)))
            .unwrap();
        assert!(attack.evaluation.is_some());
    }
}
