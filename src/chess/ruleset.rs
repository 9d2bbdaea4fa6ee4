//! `Ruleset` adapter for chess.
//!
//! Payload: `{"type": "move", "src": "e2", "dst": "e4", "promotion": "queen"?}`.
//! `create` accepts a serialized `ChessState`, or `{"fen": "..."}`.

use std::any::Any;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::board::{PieceKind, Square};
use super::fen;
use super::rules;
use super::state::ChessState;
use crate::core::{ApplyOutcome, ChessConfig, Explanation, Result, RulesError};
use crate::rules::{state_mut, state_ref, GameState, Ruleset, Scheduler};

pub const CHESS_RULESET: &str = "chess";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChessAction {
    Move {
        src: Square,
        dst: Square,
        #[serde(default)]
        promotion: Option<PieceKind>,
    },
}

impl ChessAction {
    pub fn from_value(raw: &Value) -> Result<Self> {
        serde_json::from_value(raw.clone()).map_err(|e| RulesError::MalformedAction(e.to_string()))
    }
}

impl GameState for ChessState {
    fn ruleset(&self) -> &'static str {
        CHESS_RULESET
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

#[derive(Clone, Debug, Default)]
pub struct ChessRuleset {
    config: ChessConfig,
}

impl ChessRuleset {
    pub fn new(config: ChessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChessConfig {
        &self.config
    }

    fn promotion(&self, requested: Option<PieceKind>) -> Option<PieceKind> {
        requested.or(Some(self.config.default_promotion))
    }
}

impl Ruleset for ChessRuleset {
    fn name(&self) -> &'static str {
        CHESS_RULESET
    }

    fn scheduler(&self) -> Scheduler {
        Scheduler::SideToMove
    }

    fn create(&self, payload: Option<&Value>) -> Result<Box<dyn GameState>> {
        let state = match payload {
            None | Some(Value::Null) => ChessState::initial(),
            Some(p) => match p.get("fen").and_then(Value::as_str) {
                Some(text) => fen::from_fen(text)?,
                None => serde_json::from_value(p.clone()).map_err(|e| RulesError::MalformedState(e.to_string()))?,
            },
        };
        debug!(fen = %fen::to_fen(&state), "chess game created");
        Ok(Box::new(state))
    }

    fn evaluate(&self, state: &dyn GameState, action: &Value) -> Result<Explanation> {
        let st = state_ref::<ChessState>(state, CHESS_RULESET)?;
        let ChessAction::Move { src, dst, promotion } = ChessAction::from_value(action)?;
        Ok(rules::explain_move(st, src, dst, self.promotion(promotion)))
    }

    fn apply(&self, state: &mut dyn GameState, action: &Value) -> Result<ApplyOutcome> {
        let st = state_mut::<ChessState>(state, CHESS_RULESET)?;
        let ChessAction::Move { src, dst, promotion } = ChessAction::from_value(action)?;
        Ok(rules::apply_move(st, src, dst, self.promotion(promotion)))
    }

    fn summarize(&self, state: &dyn GameState) -> Result<Value> {
        let st = state_ref::<ChessState>(state, CHESS_RULESET)?;
        Ok(serde_json::to_value(rules::summarize(st, &self.config))?)
    }

    fn legal_actions(&self, state: &dyn GameState, explain: bool) -> Result<Vec<Value>> {
        let st = state_ref::<ChessState>(state, CHESS_RULESET)?;
        rules::legal_moves(st)
            .into_iter()
            .map(|m| {
                let mut payload = serde_json::to_value(ChessAction::Move {
                    src: m.src,
                    dst: m.dst,
                    promotion: m.promotion,
                })?;
                if explain {
                    payload["kind"] = serde_json::to_value(m.kind)?;
                }
                Ok(payload)
            })
            .collect()
    }

    fn info(&self, state: &dyn GameState) -> Result<Value> {
        let st = state_ref::<ChessState>(state, CHESS_RULESET)?;
        let example = rules::legal_moves(st)
            .first()
            .map(|m| json!({ "type": "move", "src": m.src, "dst": m.dst }))
            .unwrap_or(Value::Null);
        Ok(json!({
            "ruleset": CHESS_RULESET,
            "scheduler": self.scheduler(),
            "fen": fen::to_fen(st),
            "defaults": self.config,
            "actions": { "move": { "example": example } },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::board::Color;
    use crate::chess::state::ChessStatus;

    fn mv(src: &str, dst: &str) -> Value {
        json!({"type": "move", "src": src, "dst": dst})
    }

    #[test]
    fn test_create_defaults_to_start() {
        let rules = ChessRuleset::default();
        let state = rules.create(None).unwrap();
        let summary = rules.summarize(state.as_ref()).unwrap();
        assert_eq!(summary["status"], "ongoing");
        assert_eq!(summary["turn"], "white");
        assert!(summary["winner"].is_null());
    }

    #[test]
    fn test_create_from_fen() {
        let rules = ChessRuleset::default();
        let state = rules.create(Some(&json!({"fen": "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"}))).unwrap();
        let summary = rules.summarize(state.as_ref()).unwrap();
        assert_eq!(summary["status"], "stalemate");
    }

    #[test]
    fn test_apply_mutates_in_place() {
        let rules = ChessRuleset::default();
        let mut state = rules.create(None).unwrap();
        assert!(rules.apply(state.as_mut(), &mv("e2", "e4")).unwrap().ok);
        let st = state_ref::<ChessState>(state.as_ref(), CHESS_RULESET).unwrap();
        assert_eq!(st.turn, Color::Black);
        assert_eq!(st.status, ChessStatus::Ongoing);

        let out = rules.apply(state.as_mut(), &mv("e4", "e5")).unwrap();
        assert_eq!(out.error.as_deref(), Some("not your turn"));
    }

    #[test]
    fn test_malformed_payloads() {
        let rules = ChessRuleset::default();
        let state = rules.create(None).unwrap();
        for bad in [
            json!({"type": "castle"}),
            json!({"type": "move", "src": "e2"}),
            json!({"type": "move", "src": "z9", "dst": "e4"}),
            json!({"src": "e2", "dst": "e4"}),
        ] {
            let err = rules.evaluate(state.as_ref(), &bad).unwrap_err();
            assert_eq!(err.code(), "MALFORMED_ACTION", "{bad}");
        }
    }

    #[test]
    fn test_default_promotion_from_config() {
        let rules = ChessRuleset::new(ChessConfig::default().with_default_promotion(PieceKind::Rook));
        let mut state = rules.create(Some(&json!({"fen": "7k/P7/8/8/8/8/8/K7 w - - 0 1"}))).unwrap();
        let e = rules.evaluate(state.as_ref(), &mv("a7", "a8")).unwrap();
        assert_eq!(e.outcome["promotion"], "rook");
        rules.apply(state.as_mut(), &mv("a7", "a8")).unwrap();
        let fen = rules.info(state.as_ref()).unwrap()["fen"].clone();
        assert_eq!(fen, "R6k/8/8/8/8/8/8/K7 b - - 0 1");
    }

    #[test]
    fn test_legal_actions_from_start() {
        let rules = ChessRuleset::default();
        let state = rules.create(None).unwrap();
        let moves = rules.legal_actions(state.as_ref(), true).unwrap();
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().all(|m| m["type"] == "move" && m["kind"] == "normal"));
        for m in &moves {
            assert!(rules.evaluate(state.as_ref(), m).unwrap().ok);
        }
    }

    #[test]
    fn test_wrong_state_rejected() {
        let chess = ChessRuleset::default();
        let tbs = crate::tbs::TbsRuleset::default().create(None).unwrap();
        let err = chess.summarize(tbs.as_ref()).unwrap_err();
        assert!(matches!(err, RulesError::StateMismatch { expected: "chess" }));
    }
}
