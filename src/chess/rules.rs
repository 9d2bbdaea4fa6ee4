//! Chess move legality.
//!
//! Legality is split in two stages:
//!
//! 1. `legal_basic`: piece movement, path, capture, en passant, promotion
//!    and castling preconditions. Cheap, board-only.
//! 2. Self-check probe: apply the move to a cloned state and test whether
//!    the mover's king is attacked. A move that fails only here is reported
//!    separately ("move leaves king in check").
//!
//! `square_attacked` is the single check-detection primitive; castling,
//! self-check and mate detection all go through it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::board::{Board, Color, Piece, PieceKind, Square};
use super::state::{ChessState, ChessStatus};
use crate::core::{ApplyOutcome, ChessConfig, Explanation};

/// Rejection reason for moves that pass basic legality but expose the king.
pub const SELF_CHECK: &str = "move leaves king in check";

const KNIGHT_JUMPS: [(i32, i32); 8] = [(1, 2), (2, 1), (-1, 2), (-2, 1), (1, -2), (2, -1), (-1, -2), (-2, -1)];
const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const KING_STEPS: [(i32, i32); 8] = [(1, 1), (1, -1), (-1, 1), (-1, -1), (1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Normal,
    Capture,
    EnPassant,
    /// Non-capturing pawn push onto the last rank.
    Promotion,
    #[serde(rename = "castle_k")]
    CastleKingside,
    #[serde(rename = "castle_q")]
    CastleQueenside,
}

/// What a basically-legal move will do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInfo {
    pub src: Square,
    pub dst: Square,
    pub kind: MoveKind,
    /// Square of the captured piece; differs from `dst` for en passant.
    pub captured_at: Option<Square>,
    /// En passant target created by a double pawn advance.
    pub sets_en_passant: Option<Square>,
    pub promotion: Option<PieceKind>,
}

/// Why `legal_basic` refused a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub reason: &'static str,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}

fn reject<T>(reason: &'static str) -> Result<T, Rejection> {
    Err(Rejection { reason })
}

/// Squares strictly between `from` and `to` along `(dx, dy)` are empty.
fn path_clear(board: &Board, from: Square, to: Square, dx: i32, dy: i32) -> bool {
    let mut cur = from.offset(dx, dy);
    while let Some(sq) = cur {
        if sq == to {
            return true;
        }
        if board.contains_key(&sq) {
            return false;
        }
        cur = sq.offset(dx, dy);
    }
    false
}

fn ray_hits(board: &Board, from: Square, dirs: &[(i32, i32)], target: Square) -> bool {
    dirs.iter().any(|&(dx, dy)| {
        let mut cur = from.offset(dx, dy);
        while let Some(sq) = cur {
            if sq == target {
                return true;
            }
            if board.contains_key(&sq) {
                return false;
            }
            cur = sq.offset(dx, dy);
        }
        false
    })
}

fn attacks(board: &Board, from: Square, piece: Piece, target: Square) -> bool {
    let hits = |offsets: &[(i32, i32)]| offsets.iter().any(|&(dx, dy)| from.offset(dx, dy) == Some(target));
    match piece.kind {
        PieceKind::Pawn => {
            let dir = piece.color.forward();
            hits(&[(-1, dir), (1, dir)])
        }
        PieceKind::Knight => hits(&KNIGHT_JUMPS),
        PieceKind::King => hits(&KING_STEPS),
        PieceKind::Bishop => ray_hits(board, from, &DIAGONALS, target),
        PieceKind::Rook => ray_hits(board, from, &ORTHOGONALS, target),
        PieceKind::Queen => ray_hits(board, from, &KING_STEPS, target),
    }
}

/// Whether any piece of color `by` attacks `sq`.
pub fn square_attacked(state: &ChessState, sq: Square, by: Color) -> bool {
    state
        .board
        .iter()
        .any(|(from, piece)| piece.color == by && attacks(&state.board, *from, *piece, sq))
}

/// Whether `side`'s king is attacked. A side without a king is never in check.
pub fn in_check(state: &ChessState, side: Color) -> bool {
    state
        .king_square(side)
        .is_some_and(|k| square_attacked(state, k, side.opposite()))
}

fn castle(state: &ChessState, color: Color, kingside: bool) -> Result<MoveKind, Rejection> {
    let home = color.home_rank();
    let at = |file: u8| Square::new(file, home);
    let (has_right, missing, empty, safe): (bool, &'static str, &[u8], &[u8]) = match (color, kingside) {
        (Color::White, true) => (state.castling.white_kingside, "no K right", &[5, 6], &[5, 6]),
        (Color::White, false) => (state.castling.white_queenside, "no Q right", &[1, 2, 3], &[3, 2]),
        (Color::Black, true) => (state.castling.black_kingside, "no k right", &[5, 6], &[5, 6]),
        (Color::Black, false) => (state.castling.black_queenside, "no q right", &[1, 2, 3], &[3, 2]),
    };
    if !has_right {
        return reject(missing);
    }
    let corner = at(if kingside { 7 } else { 0 });
    if state.piece_at(corner) != Some(Piece::new(PieceKind::Rook, color)) {
        return reject("no rook on corner");
    }
    if empty.iter().any(|&f| state.board.contains_key(&at(f))) {
        return reject("blocked");
    }
    let enemy = color.opposite();
    if in_check(state, color) || safe.iter().any(|&f| square_attacked(state, at(f), enemy)) {
        return reject("through check");
    }
    Ok(if kingside {
        MoveKind::CastleKingside
    } else {
        MoveKind::CastleQueenside
    })
}

/// Movement legality without the self-check probe.
///
/// `promotion` picks the piece a pawn reaching the last rank becomes;
/// `None` means queen. It is ignored for every other move.
pub fn legal_basic(
    state: &ChessState,
    src: Square,
    dst: Square,
    promotion: Option<PieceKind>,
) -> Result<MoveInfo, Rejection> {
    if src == dst {
        return reject("same square");
    }
    let Some(piece) = state.piece_at(src) else {
        return reject("no piece at src");
    };
    if piece.color != state.turn {
        return reject("not your turn");
    }
    let target = state.piece_at(dst);
    if target.is_some_and(|t| t.color == piece.color) {
        return reject("friendly on dst");
    }

    let dx = i32::from(dst.file) - i32::from(src.file);
    let dy = i32::from(dst.rank) - i32::from(src.rank);
    let plain = if target.is_some() {
        MoveKind::Capture
    } else {
        MoveKind::Normal
    };
    let mut info = MoveInfo {
        src,
        dst,
        kind: plain,
        captured_at: target.map(|_| dst),
        sets_en_passant: None,
        promotion: None,
    };

    match piece.kind {
        PieceKind::Pawn => {
            let dir = piece.color.forward();
            let start = match piece.color {
                Color::White => 1,
                Color::Black => 6,
            };
            if dx == 0 {
                if dy == dir && target.is_none() {
                    info.kind = MoveKind::Normal;
                } else if src.rank == start && dy == 2 * dir && target.is_none() {
                    let mid = Square::new(src.file, (i32::from(src.rank) + dir) as u8);
                    if state.board.contains_key(&mid) {
                        return reject("blocked mid");
                    }
                    info.sets_en_passant = Some(mid);
                } else {
                    return reject("illegal pawn advance");
                }
            } else if dx.abs() == 1 && dy == dir {
                if target.is_none() {
                    if state.en_passant != Some(dst) {
                        return reject("no piece to capture");
                    }
                    let victim = Square::new(dst.file, src.rank);
                    match state.piece_at(victim) {
                        Some(v) if v.kind == PieceKind::Pawn && v.color != piece.color => {
                            info.kind = MoveKind::EnPassant;
                            info.captured_at = Some(victim);
                        }
                        _ => return reject("no en passant victim"),
                    }
                }
            } else {
                return reject("illegal pawn move");
            }
            if dst.rank == piece.color.opposite().home_rank() {
                let promo = promotion.unwrap_or(PieceKind::Queen);
                if matches!(promo, PieceKind::Pawn | PieceKind::King) {
                    return reject("illegal promotion piece");
                }
                info.promotion = Some(promo);
                if info.kind == MoveKind::Normal {
                    info.kind = MoveKind::Promotion;
                }
            }
        }
        PieceKind::Knight => {
            if !matches!((dx.abs(), dy.abs()), (1, 2) | (2, 1)) {
                return reject("illegal knight");
            }
        }
        PieceKind::Bishop => {
            if dx.abs() != dy.abs() || !path_clear(&state.board, src, dst, dx.signum(), dy.signum()) {
                return reject("illegal bishop/path");
            }
        }
        PieceKind::Rook => {
            if (dx != 0 && dy != 0) || !path_clear(&state.board, src, dst, dx.signum(), dy.signum()) {
                return reject("illegal rook/path");
            }
        }
        PieceKind::Queen => {
            if dx.abs() != dy.abs() && dx != 0 && dy != 0 {
                return reject("illegal queen");
            }
            if !path_clear(&state.board, src, dst, dx.signum(), dy.signum()) {
                return reject("path blocked");
            }
        }
        PieceKind::King => {
            let home = piece.color.home_rank();
            if dx.abs().max(dy.abs()) == 1 {
                // plain step, kind already set
            } else if src == Square::new(4, home) && dst.rank == home && (dst.file == 6 || dst.file == 2) {
                info.kind = castle(state, piece.color, dst.file == 6)?;
            } else {
                return reject("illegal king");
            }
        }
    }
    Ok(info)
}

/// Perform a basically-legal move: board, counters, rights, side to move.
pub fn apply_basic(state: &mut ChessState, info: &MoveInfo) {
    let Some(piece) = state.board.remove(&info.src) else {
        return;
    };
    if let Some(cap) = info.captured_at {
        state.board.remove(&cap);
    }
    state.en_passant = info.sets_en_passant;
    if piece.kind == PieceKind::Pawn || info.captured_at.is_some() {
        state.halfmove_clock = 0;
    } else {
        state.halfmove_clock += 1;
    }
    let placed = info.promotion.map_or(piece, |kind| Piece::new(kind, piece.color));
    state.board.insert(info.dst, placed);

    let home = piece.color.home_rank();
    let rook_hop = match info.kind {
        MoveKind::CastleKingside => Some((7, 5)),
        MoveKind::CastleQueenside => Some((0, 3)),
        _ => None,
    };
    if let Some((from, to)) = rook_hop {
        if let Some(rook) = state.board.remove(&Square::new(from, home)) {
            state.board.insert(Square::new(to, home), rook);
        }
    }

    if piece.kind == PieceKind::King {
        state.castling.clear(piece.color);
    }
    // A rook leaving its corner, or anything landing on one, ends that right.
    state.castling.clear_corner(info.src);
    state.castling.clear_corner(info.dst);

    state.turn = state.turn.opposite();
    if state.turn == Color::White {
        state.fullmove_number += 1;
    }
}

/// Full legality: basic rules plus the self-check probe on a scratch copy.
fn checked(state: &ChessState, info: &MoveInfo) -> (ChessState, bool) {
    let mover = state.turn;
    let mut probe = state.clone();
    apply_basic(&mut probe, info);
    let exposed = in_check(&probe, mover);
    (probe, exposed)
}

/// Dry-run a move and explain every check.
pub fn explain_move(state: &ChessState, src: Square, dst: Square, promotion: Option<PieceKind>) -> Explanation {
    let Some(piece) = state.piece_at(src) else {
        return Explanation::rejected("no piece at src").with_step("piece_at_src", false);
    };
    let explanation = Explanation::new(false)
        .with_step("piece_at_src", true)
        .with_step("turn", piece.color == state.turn);

    let info = match legal_basic(state, src, dst, promotion) {
        Ok(info) => info,
        Err(r) => {
            return explanation
                .with_step_info("basic_legality", false, json!({ "reason": r.reason }))
                .with_outcome("reason", Value::from(r.reason));
        }
    };
    let detail = serde_json::to_value(info).unwrap_or(Value::Null);
    let (probe, exposed) = checked(state, &info);

    let mut explanation = explanation
        .with_step_info("basic_legality", true, detail)
        .with_step("self_check_after_move", !exposed);
    explanation.ok = !exposed;
    if exposed {
        return explanation.with_outcome("reason", Value::from(SELF_CHECK));
    }
    explanation
        .with_outcome("kind", serde_json::to_value(info.kind).unwrap_or(Value::Null))
        .with_outcome("promotion", serde_json::to_value(info.promotion).unwrap_or(Value::Null))
        .with_outcome("opponent_in_check", Value::Bool(in_check(&probe, probe.turn)))
}

/// Play a move in place. The state is untouched on refusal.
pub fn apply_move(state: &mut ChessState, src: Square, dst: Square, promotion: Option<PieceKind>) -> ApplyOutcome {
    let info = match legal_basic(state, src, dst, promotion) {
        Ok(info) => info,
        Err(r) => return ApplyOutcome::refused(r.reason),
    };
    let (next, exposed) = checked(state, &info);
    if exposed {
        return ApplyOutcome::refused(SELF_CHECK);
    }
    debug!(%src, %dst, kind = ?info.kind, "chess move applied");
    *state = next;
    ApplyOutcome::applied()
}

/// Every fully legal move for the side to move, in board order.
/// Promotions are listed once per promotion piece.
pub fn legal_moves(state: &ChessState) -> Vec<MoveInfo> {
    let mut out = Vec::new();
    let movers: Vec<Square> = state
        .board
        .iter()
        .filter(|(_, p)| p.color == state.turn)
        .map(|(sq, _)| *sq)
        .collect();
    for src in movers {
        for dst in Square::all() {
            let Ok(info) = legal_basic(state, src, dst, None) else {
                continue;
            };
            if checked(state, &info).1 {
                continue;
            }
            if info.promotion.is_some() {
                out.extend(PieceKind::PROMOTIONS.iter().map(|&kind| MoveInfo {
                    promotion: Some(kind),
                    ..info
                }));
            } else {
                out.push(info);
            }
        }
    }
    out
}

/// Whether `side` has any move that does not leave its king in check.
pub fn has_any_legal_move(state: &ChessState, side: Color) -> bool {
    let as_side;
    let state = if state.turn == side {
        state
    } else {
        let mut flipped = state.clone();
        flipped.turn = side;
        flipped.en_passant = None;
        as_side = flipped;
        &as_side
    };
    state.board.iter().filter(|(_, p)| p.color == side).any(|(src, _)| {
        Square::all().any(|dst| {
            legal_basic(state, *src, dst, None)
                .map(|info| !checked(state, &info).1)
                .unwrap_or(false)
        })
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessSummary {
    pub status: ChessStatus,
    pub winner: Option<Color>,
    pub turn: Color,
    pub fullmove: u32,
    pub in_check: bool,
}

/// Derive the game status from the position. Pure; see
/// [`ChessState::refresh_status`] to store it.
pub fn summarize(state: &ChessState, config: &ChessConfig) -> ChessSummary {
    let side = state.turn;
    let check = in_check(state, side);
    let (status, winner) = if state.halfmove_clock >= config.fifty_move_halfmoves {
        (ChessStatus::Draw, None)
    } else if has_any_legal_move(state, side) {
        (ChessStatus::Ongoing, None)
    } else if check {
        (ChessStatus::Checkmate, Some(side.opposite()))
    } else {
        (ChessStatus::Stalemate, None)
    };
    ChessSummary {
        status,
        winner,
        turn: side,
        fullmove: state.fullmove_number,
        in_check: check,
    }
}
