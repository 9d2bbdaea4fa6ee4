//! Chess position state.

use serde::{Deserialize, Serialize};

use super::board::{initial_board, Board, Color, Piece, PieceKind, Square};
use super::rules;
use crate::core::ChessConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::all()
    }
}

impl CastlingRights {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    #[must_use]
    pub const fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    #[must_use]
    pub const fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    /// Drop both rights of `color`.
    pub fn clear(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Drop the right tied to a rook's home corner, if `sq` is one.
    pub fn clear_corner(&mut self, sq: Square) {
        match (sq.file, sq.rank) {
            (7, 0) => self.white_kingside = false,
            (0, 0) => self.white_queenside = false,
            (7, 7) => self.black_kingside = false,
            (0, 7) => self.black_queenside = false,
            _ => {}
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChessStatus {
    #[default]
    Ongoing,
    Checkmate,
    Stalemate,
    Draw,
}

impl ChessStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, ChessStatus::Ongoing)
    }
}

/// A full position plus the game's stored outcome.
///
/// `status` and `winner` are only written by [`ChessState::refresh_status`];
/// moves do not update them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessState {
    pub board: Board,
    pub turn: Color,
    #[serde(default)]
    pub castling: CastlingRights,
    #[serde(default)]
    pub en_passant: Option<Square>,
    #[serde(default)]
    pub halfmove_clock: u32,
    #[serde(default = "default_fullmove")]
    pub fullmove_number: u32,
    #[serde(default)]
    pub status: ChessStatus,
    #[serde(default)]
    pub winner: Option<Color>,
}

fn default_fullmove() -> u32 {
    1
}

impl Default for ChessState {
    fn default() -> Self {
        Self::initial()
    }
}

impl ChessState {
    /// The standard starting position, white to move.
    #[must_use]
    pub fn initial() -> Self {
        Self::with_board(initial_board(), Color::White)
    }

    /// A position with every castling right set and fresh counters.
    #[must_use]
    pub fn with_board(board: Board, turn: Color) -> Self {
        Self {
            board,
            turn,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            status: ChessStatus::Ongoing,
            winner: None,
        }
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.get(&sq).copied()
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.board
            .iter()
            .find(|(_, p)| p.color == color && p.kind == PieceKind::King)
            .map(|(sq, _)| *sq)
    }

    /// Recompute and store `status` / `winner`.
    pub fn refresh_status(&mut self, config: &ChessConfig) {
        let summary = rules::summarize(self, config);
        self.status = summary.status;
        self.winner = summary.winner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::board::sq;

    #[test]
    fn test_initial_state() {
        let st = ChessState::initial();
        assert_eq!(st.turn, Color::White);
        assert_eq!(st.castling, CastlingRights::all());
        assert_eq!(st.fullmove_number, 1);
        assert_eq!(st.king_square(Color::Black), Some(sq("e8").unwrap()));
        assert_eq!(st.status, ChessStatus::Ongoing);
    }

    #[test]
    fn test_clear_corner() {
        let mut rights = CastlingRights::all();
        rights.clear_corner(sq("h8").unwrap());
        rights.clear_corner(sq("e4").unwrap());
        assert!(!rights.black_kingside);
        assert!(rights.black_queenside && rights.white_kingside && rights.white_queenside);
        rights.clear(Color::White);
        assert!(!rights.kingside(Color::White) && !rights.queenside(Color::White));
    }

    #[test]
    fn test_state_json_defaults() {
        let json = serde_json::json!({
            "board": {"e1": {"type": "king", "color": "white"}, "e8": {"type": "king", "color": "black"}},
            "turn": "black"
        });
        let st: ChessState = serde_json::from_value(json).unwrap();
        assert_eq!(st.turn, Color::Black);
        assert_eq!(st.fullmove_number, 1);
        assert!(st.castling.white_kingside);
        assert_eq!(st.en_passant, None);
    }
}
