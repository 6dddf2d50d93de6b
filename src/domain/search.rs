//! Depth-bounded minimax with alpha-beta pruning.
//!
//! Every ply works on its own clone of the position, so the caller's position
//! is never touched and there is no shared mutable state to restore when a
//! branch is cut off.

use shakmaty::{Chess, Position};

use crate::domain::chess::Move;
use crate::domain::evaluation::evaluate_position;

/// Default lookahead in plies
pub const DEFAULT_SEARCH_DEPTH: u8 = 2;

/// Outcome of a root search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Minimax value of `best_move` from White's point of view
    pub score: i32,
}

/// Find the best move for the side to move.
///
/// `maximizing` is true when the side to move wants the highest score
/// (White in the usual convention). Ties go to the first move in the rules
/// engine's enumeration order. Returns `None` when there is no legal move.
pub fn search_best_move(position: &Chess, depth: u8, maximizing: bool) -> Option<SearchResult> {
    let depth = depth.max(1);
    let mut alpha = i32::MIN;
    let mut beta = i32::MAX;
    let mut best: Option<SearchResult> = None;

    for m in &position.legal_moves() {
        let Some(mv) = Move::from_shakmaty(m) else {
            continue;
        };
        let Ok(child) = position.clone().play(m.clone()) else {
            continue;
        };
        let score = minimax(&child, depth - 1, alpha, beta, !maximizing);

        // Strict comparison keeps the first move reaching the best value
        let improves = match best {
            None => true,
            Some(current) if maximizing => score > current.score,
            Some(current) => score < current.score,
        };
        if improves {
            best = Some(SearchResult {
                best_move: mv,
                score,
            });
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }
    }

    best
}

/// Minimax value of `position` searched `depth` plies deep
pub fn minimax(position: &Chess, depth: u8, mut alpha: i32, mut beta: i32, maximizing: bool) -> i32 {
    if depth == 0 {
        return evaluate_position(position);
    }
    let moves = position.legal_moves();
    if moves.is_empty() || position.is_insufficient_material() {
        return evaluate_position(position);
    }

    let mut best_value = if maximizing { i32::MIN } else { i32::MAX };
    for m in &moves {
        let Ok(child) = position.clone().play(m.clone()) else {
            continue;
        };
        let value = minimax(&child, depth - 1, alpha, beta, !maximizing);

        if maximizing {
            best_value = best_value.max(value);
            alpha = alpha.max(best_value);
        } else {
            best_value = best_value.min(value);
            beta = beta.min(best_value);
        }
        if beta <= alpha {
            break;
        }
    }
    best_value
}
