//! Forsyth-Edwards Notation.
//!
//! ```
//! use rust_rulesets::chess::{fen, ChessState};
//!
//! let start = fen::to_fen(&ChessState::initial());
//! assert_eq!(start, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
//! assert_eq!(fen::from_fen(&start).unwrap(), ChessState::initial());
//! ```

use super::board::{Board, Color, Piece, Square};
use super::state::{CastlingRights, ChessState};
use crate::core::{Result, RulesError};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn invalid(msg: impl Into<String>) -> RulesError {
    RulesError::InvalidFen(msg.into())
}

pub fn to_fen(state: &ChessState) -> String {
    let mut ranks = Vec::with_capacity(8);
    for rank in (0..8u8).rev() {
        let mut row = String::new();
        let mut empty = 0;
        for file in 0..8u8 {
            match state.board.get(&Square::new(file, rank)) {
                Some(piece) => {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.fen_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            row.push_str(&empty.to_string());
        }
        ranks.push(row);
    }

    let turn = match state.turn {
        Color::White => "w",
        Color::Black => "b",
    };
    let c = &state.castling;
    let mut castling: String = [
        (c.white_kingside, 'K'),
        (c.white_queenside, 'Q'),
        (c.black_kingside, 'k'),
        (c.black_queenside, 'q'),
    ]
    .iter()
    .filter(|(on, _)| *on)
    .map(|(_, ch)| *ch)
    .collect();
    if castling.is_empty() {
        castling.push('-');
    }
    let ep = state.en_passant.map_or_else(|| "-".to_string(), |sq| sq.to_string());

    format!(
        "{} {} {} {} {} {}",
        ranks.join("/"),
        turn,
        castling,
        ep,
        state.halfmove_clock,
        state.fullmove_number
    )
}

fn parse_board(placement: &str) -> Result<Board> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(invalid(format!("expected 8 ranks, found {}", rows.len())));
    }
    let mut board = Board::new();
    for (row, text) in rows.iter().enumerate() {
        let rank = 7 - row as u8;
        let mut file: u8 = 0;
        for ch in text.chars() {
            if let Some(skip) = ch.to_digit(10) {
                if skip == 0 || skip > 8 {
                    return Err(invalid(format!("bad empty count '{ch}'")));
                }
                file += skip as u8;
            } else {
                let piece = Piece::from_fen_char(ch).ok_or_else(|| invalid(format!("unknown piece '{ch}'")))?;
                if file >= 8 {
                    return Err(invalid(format!("rank {} overflows", rank + 1)));
                }
                board.insert(Square::new(file, rank), piece);
                file += 1;
            }
            if file > 8 {
                return Err(invalid(format!("rank {} overflows", rank + 1)));
            }
        }
        if file != 8 {
            return Err(invalid(format!("rank {} has {} files", rank + 1, file)));
        }
    }
    Ok(board)
}

fn parse_castling(text: &str) -> Result<CastlingRights> {
    let mut rights = CastlingRights::none();
    if text == "-" {
        return Ok(rights);
    }
    for ch in text.chars() {
        match ch {
            'K' => rights.white_kingside = true,
            'Q' => rights.white_queenside = true,
            'k' => rights.black_kingside = true,
            'q' => rights.black_queenside = true,
            _ => return Err(invalid(format!("bad castling field '{text}'"))),
        }
    }
    Ok(rights)
}

fn parse_counter(text: Option<&str>, default: u32, name: &str) -> Result<u32> {
    match text {
        None => Ok(default),
        Some(t) => t.parse().map_err(|_| invalid(format!("bad {name} '{t}'"))),
    }
}

/// Parse a FEN record. The two move counters may be omitted.
///
/// The returned state has status `ongoing`; call
/// [`ChessState::refresh_status`] to classify the position.
pub fn from_fen(text: &str) -> Result<ChessState> {
    let mut fields = text.split_whitespace();
    let placement = fields.next().ok_or_else(|| invalid("empty record"))?;
    let board = parse_board(placement)?;

    let turn = match fields.next() {
        Some("w") => Color::White,
        Some("b") => Color::Black,
        other => return Err(invalid(format!("bad side to move {other:?}"))),
    };
    let castling = parse_castling(fields.next().ok_or_else(|| invalid("missing castling field"))?)?;
    let en_passant = match fields.next() {
        None | Some("-") => None,
        Some(sq) => Some(sq.parse::<Square>().map_err(|_| invalid(format!("bad en passant square '{sq}'")))?),
    };
    let halfmove_clock = parse_counter(fields.next(), 0, "halfmove clock")?;
    let fullmove_number = parse_counter(fields.next(), 1, "fullmove number")?;
    if fields.next().is_some() {
        return Err(invalid("trailing fields"));
    }

    let mut state = ChessState::with_board(board, turn);
    state.castling = castling;
    state.en_passant = en_passant;
    state.halfmove_clock = halfmove_clock;
    state.fullmove_number = fullmove_number;
    Ok(state)
}
