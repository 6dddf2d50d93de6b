use shakmaty::{Chess, Color, Position, Role};

// Material values in whole pawns. The king's value is far above everything
// else combined so that losing it can never look like a small deficit.
const PAWN_VALUE: i32 = 1;
const KNIGHT_VALUE: i32 = 3;
const BISHOP_VALUE: i32 = 3;
const ROOK_VALUE: i32 = 5;
const QUEEN_VALUE: i32 = 9;
const KING_VALUE: i32 = 90;

/// Returns the base material value of a piece
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => KING_VALUE,
    }
}

/// Evaluates a chess position by material alone.
/// Positive scores favor White, negative scores favor Black.
pub fn evaluate_position(position: &Chess) -> i32 {
    let board = position.board();
    board
        .occupied()
        .into_iter()
        .filter_map(|sq| board.piece_at(sq))
        .map(|piece| {
            let value = piece_value(piece.role);
            if piece.color == Color::White {
                value
            } else {
                -value
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::decode;

    #[test]
    fn test_starting_position_is_balanced() {
        assert_eq!(evaluate_position(&Chess::default()), 0);
    }

    #[test]
    fn test_material_imbalance() {
        // White is missing the queen
        let pos = decode("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1").unwrap();
        assert_eq!(evaluate_position(&pos), -9);

        // Black is missing a knight and a pawn
        let pos = decode("r1bqkbnr/ppppppp1/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(evaluate_position(&pos), 4);
    }

    #[test]
    fn test_bare_kings_cancel_out() {
        let pos = decode("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
        assert_eq!(evaluate_position(&pos), 0);
    }

    #[test]
    fn test_piece_values() {
        assert_eq!(piece_value(Role::Pawn), 1);
        assert_eq!(piece_value(Role::Queen), 9);
        assert!(piece_value(Role::King) > 2 * (8 + 2 * 3 + 2 * 3 + 2 * 5 + 9));
    }
}
