//! Thin adapter over the shakmaty rules engine.
//!
//! Everything the session needs from chess rules goes through here: legal
//! move enumeration in our [`Move`] form, move application with SAN, and
//! terminal status detection.

use std::fmt;

use shakmaty::san::San;
use shakmaty::{Chess, Color, Position, Role, Square};

use crate::domain::chess::{Move, PieceColor};

/// Halfmove clock value at which the fifty-move rule ends the game
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Number of occurrences of the same position that ends the game
const REPETITION_LIMIT: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DrawReason {
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

/// Game status after the most recent move
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Ongoing { turn: Color },
    Check { turn: Color },
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    /// No further moves are accepted in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate { .. } | GameStatus::Stalemate | GameStatus::Draw(_)
        )
    }

    pub fn is_check(&self) -> bool {
        matches!(self, GameStatus::Check { .. })
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing { turn } => {
                write!(f, "Turn: {}", PieceColor::from(*turn).name())
            }
            GameStatus::Check { turn } => {
                write!(f, "CHECK! Turn: {}", PieceColor::from(*turn).name())
            }
            GameStatus::Checkmate { winner } => {
                write!(f, "CHECKMATE! {} wins.", PieceColor::from(*winner).name())
            }
            GameStatus::Stalemate | GameStatus::Draw(_) => f.write_str("DRAW!"),
        }
    }
}

/// The move could not be matched against the legal moves of the position
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IllegalMove(pub Move);

/// All legal moves in the rules engine's enumeration order
pub fn legal_moves(position: &Chess) -> Vec<Move> {
    position
        .legal_moves()
        .iter()
        .filter_map(Move::from_shakmaty)
        .collect()
}

/// Legal destination squares for the piece standing on `square`
pub fn destinations(position: &Chess, square: Square) -> Vec<Square> {
    let mut targets: Vec<Square> = legal_moves(position)
        .into_iter()
        .filter(|m| m.from == square)
        .map(|m| m.to)
        .collect();
    // Promotions list the same target square once per role
    targets.dedup();
    targets
}

/// Find the rules-engine move matching a from/to intent.
///
/// A promotion-less intent onto the last rank promotes to a queen.
pub fn resolve(position: &Chess, intent: Move) -> Option<shakmaty::Move> {
    let mut fallback = None;

    for m in &position.legal_moves() {
        let Some(candidate) = Move::from_shakmaty(m) else {
            continue;
        };
        if candidate.from != intent.from || candidate.to != intent.to {
            continue;
        }

        match (intent.promotion, candidate.promotion) {
            (wanted, offered) if wanted == offered => return Some(m.clone()),
            (None, Some(Role::Queen)) => fallback = Some(m.clone()),
            _ => {}
        }
    }

    fallback
}

/// Apply a move, producing the next position and the move's SAN.
/// The input position is left untouched.
pub fn apply(position: &Chess, intent: Move) -> Result<(Chess, String), IllegalMove> {
    let m = resolve(position, intent).ok_or(IllegalMove(intent))?;
    let san = San::from_move(position, m.clone()).to_string();
    let next = position.clone().play(m).map_err(|_| IllegalMove(intent))?;
    Ok((next, san))
}

/// Identity of a position for repetition purposes: placement, side to move,
/// castling rights and en passant square, ignoring the move counters.
pub fn repetition_key(code: &str) -> String {
    code.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Terminal-state detection.
///
/// `repetitions` is how many times the current position has occurred in the
/// game so far, including now.
pub fn status(position: &Chess, repetitions: usize) -> GameStatus {
    let turn = position.turn();
    let no_moves = position.legal_moves().is_empty();

    if no_moves && position.is_check() {
        GameStatus::Checkmate { winner: !turn }
    } else if no_moves {
        GameStatus::Stalemate
    } else if position.is_insufficient_material() {
        GameStatus::Draw(DrawReason::InsufficientMaterial)
    } else if position.halfmoves() >= FIFTY_MOVE_HALFMOVES {
        GameStatus::Draw(DrawReason::FiftyMoveRule)
    } else if repetitions >= REPETITION_LIMIT {
        GameStatus::Draw(DrawReason::ThreefoldRepetition)
    } else if position.is_check() {
        GameStatus::Check { turn }
    } else {
        GameStatus::Ongoing { turn }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::decode;

    fn play_all(moves: &[&str]) -> Chess {
        moves.iter().fold(Chess::default(), |pos, uci| {
            let mv: Move = uci.parse().unwrap();
            apply(&pos, mv).unwrap().0
        })
    }

    #[test]
    fn test_starting_legal_moves() {
        let moves = legal_moves(&Chess::default());
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn test_destinations() {
        let targets = destinations(&Chess::default(), Square::G1);
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&Square::F3));
        assert!(targets.contains(&Square::H3));
        assert!(destinations(&Chess::default(), Square::E4).is_empty());
    }

    #[test]
    fn test_queen_sortie_is_not_check() {
        // 1. e4 e5 2. Qh5
        let pos = play_all(&["e2e4", "e7e5", "d1h5"]);
        assert!(!pos.is_check());
        assert_eq!(pos.turn(), Color::Black);
        assert_eq!(status(&pos, 1), GameStatus::Ongoing { turn: Color::Black });
    }

    #[test]
    fn test_illegal_move_rejected() {
        let pos = Chess::default();
        let result = apply(&pos, Move::new(Square::E2, Square::E5));
        assert_eq!(result.unwrap_err(), IllegalMove(Move::new(Square::E2, Square::E5)));
    }

    #[test]
    fn test_apply_reports_san() {
        let (_, san) = apply(&Chess::default(), Move::new(Square::G1, Square::F3)).unwrap();
        assert_eq!(san, "Nf3");
    }

    #[test]
    fn test_castling_by_king_step() {
        let pos = play_all(&["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);
        let (after, san) = apply(&pos, Move::new(Square::E1, Square::G1)).unwrap();
        assert_eq!(san, "O-O");
        assert!(after.board().piece_at(Square::G1).is_some());
        assert!(after.board().piece_at(Square::F1).is_some());
    }

    #[test]
    fn test_auto_queen_promotion() {
        let pos = decode("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let (after, san) = apply(&pos, Move::new(Square::A7, Square::A8)).unwrap();
        assert_eq!(san, "a8=Q");
        let piece = after.board().piece_at(Square::A8).unwrap();
        assert_eq!(piece.role, Role::Queen);

        let knight = Move::new(Square::A7, Square::A8).with_promotion(Role::Knight);
        let (after, _) = apply(&pos, knight).unwrap();
        assert_eq!(after.board().piece_at(Square::A8).unwrap().role, Role::Knight);
    }

    #[test]
    fn test_checkmate_status() {
        // Fool's mate
        let pos = play_all(&["f2f3", "e7e5", "g2g4", "d8h4"]);
        let status = status(&pos, 1);
        assert_eq!(status, GameStatus::Checkmate { winner: Color::Black });
        assert!(status.is_terminal());
        assert_eq!(status.to_string(), "CHECKMATE! Black wins.");
    }

    #[test]
    fn test_stalemate_status() {
        let pos = decode("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let status = status(&pos, 1);
        assert_eq!(status, GameStatus::Stalemate);
        assert!(status.is_terminal());
        assert_eq!(status.to_string(), "DRAW!");
    }

    #[test]
    fn test_draw_statuses() {
        let bare_kings = decode("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
        assert_eq!(
            status(&bare_kings, 1),
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        );

        let fifty = decode("8/8/4k3/8/8/4K3/4R3/8 w - - 100 80").unwrap();
        assert_eq!(status(&fifty, 1), GameStatus::Draw(DrawReason::FiftyMoveRule));

        let pos = Chess::default();
        assert_eq!(
            status(&pos, 3),
            GameStatus::Draw(DrawReason::ThreefoldRepetition)
        );
    }

    #[test]
    fn test_check_status_text() {
        // 1. e4 d5 2. Bb5+
        let pos = play_all(&["e2e4", "d7d5", "f1b5"]);
        let status = status(&pos, 1);
        assert_eq!(status, GameStatus::Check { turn: Color::Black });
        assert!(!status.is_terminal());
        assert_eq!(status.to_string(), "CHECK! Turn: Black");
    }

    #[test]
    fn test_repetition_key_ignores_counters() {
        let a = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let b = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 4 3";
        assert_eq!(repetition_key(a), repetition_key(b));
    }
}
