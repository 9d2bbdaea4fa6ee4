//! Chess ruleset.
//!
//! A self-contained legality engine: piece movement, check detection,
//! castling, en passant, promotion, and checkmate / stalemate / fifty-move
//! classification. Shares nothing with the tactical battle rules beyond the
//! `Ruleset` contract and the explanation types.
//!
//! ## Modules
//!
//! - `board`: squares, pieces, the sparse board map
//! - `state`: `ChessState` (position + counters + stored status)
//! - `rules`: `legal_basic`, `explain_move`, `apply_move`, `summarize`
//! - `fen`: FEN import and export
//! - `ruleset`: the `Ruleset` adapter

pub mod board;
pub mod fen;
pub mod rules;
pub mod ruleset;
pub mod state;

pub use board::{initial_board, Board, Color, Piece, PieceKind, Square};
pub use rules::{
    apply_basic, apply_move, explain_move, has_any_legal_move, in_check, legal_basic, legal_moves,
    square_attacked, summarize, ChessSummary, MoveInfo, MoveKind, Rejection, SELF_CHECK,
};
pub use ruleset::{ChessAction, ChessRuleset};
pub use state::{CastlingRights, ChessState, ChessStatus};
