//! Pure chess domain types and utilities.
//! No GPUI dependencies - this is the domain layer.

use std::fmt;
use std::str::FromStr;

use shakmaty::{Color as SColor, File, Rank, Role, Square};
use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn name(self) -> &'static str {
        match self {
            PieceColor::White => "White",
            PieceColor::Black => "Black",
        }
    }
}

impl From<SColor> for PieceColor {
    fn from(color: SColor) -> Self {
        match color {
            SColor::White => PieceColor::White,
            SColor::Black => PieceColor::Black,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    /// Asset path of the SVG drawn for this piece
    pub fn svg_path(&self) -> &'static str {
        match (self.kind, self.color) {
            (PieceKind::Pawn, PieceColor::White) => "assets/pawn-white.svg",
            (PieceKind::Pawn, PieceColor::Black) => "assets/pawn-black.svg",
            (PieceKind::Rook, PieceColor::White) => "assets/rook-white.svg",
            (PieceKind::Rook, PieceColor::Black) => "assets/rook-black.svg",
            (PieceKind::Knight, PieceColor::White) => "assets/knight-white.svg",
            (PieceKind::Knight, PieceColor::Black) => "assets/knight-black.svg",
            (PieceKind::Bishop, PieceColor::White) => "assets/bishop-white.svg",
            (PieceKind::Bishop, PieceColor::Black) => "assets/bishop-black.svg",
            (PieceKind::Queen, PieceColor::White) => "assets/queen-white.svg",
            (PieceKind::Queen, PieceColor::Black) => "assets/queen-black.svg",
            (PieceKind::King, PieceColor::White) => "assets/king-white.svg",
            (PieceKind::King, PieceColor::Black) => "assets/king-black.svg",
        }
    }
}

/// Convert row/col (0-indexed, row 0 = rank 8) to shakmaty Square
pub fn to_square(row: usize, col: usize) -> Square {
    let file = File::new(col as u32);
    let rank = Rank::new(7 - row as u32); // row 0 = rank 8, row 7 = rank 1
    Square::from_coords(file, rank)
}

/// Convert shakmaty piece to our domain Piece
pub fn shakmaty_to_piece(piece: shakmaty::Piece) -> Piece {
    let kind = match piece.role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    };
    Piece {
        kind,
        color: piece.color.into(),
    }
}

/// A move as the players and strategies see it: two squares and an optional
/// promotion role. Castling is written as the king's two-square step.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, role: Role) -> Self {
        self.promotion = Some(role);
        self
    }

    /// Describe a rules-engine move in from/to form.
    ///
    /// Returns `None` for drops, which standard chess never generates.
    pub fn from_shakmaty(m: &shakmaty::Move) -> Option<Self> {
        match m {
            shakmaty::Move::Normal {
                from,
                to,
                promotion,
                ..
            } => Some(Self {
                from: *from,
                to: *to,
                promotion: *promotion,
            }),
            shakmaty::Move::EnPassant { from, to } => Some(Self::new(*from, *to)),
            shakmaty::Move::Castle { king, rook } => {
                // The king lands on the g- or c-file next to where the rook started
                let king_dest = if rook.file() == File::H {
                    Square::from_coords(File::G, rook.rank())
                } else {
                    Square::from_coords(File::C, rook.rank())
                };
                Some(Self::new(*king, king_dest))
            }
            shakmaty::Move::Put { .. } => None,
        }
    }

    /// Long algebraic (UCI) notation, e.g. `e2e4` or `e7e8q`
    pub fn to_uci(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid move notation: {0:?}")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoveError(s.to_string());
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(err());
        }
        let from: Square = s[0..2].parse().map_err(|_| err())?;
        let to: Square = s[2..4].parse().map_err(|_| err())?;
        let mv = Self::new(from, to);
        match s[4..].chars().next() {
            Some(c) => match Role::from_char(c.to_ascii_lowercase()) {
                Some(role) if role != Role::Pawn && role != Role::King => {
                    Ok(mv.with_promotion(role))
                }
                _ => Err(err()),
            },
            None => Ok(mv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_conversion() {
        assert_eq!(to_square(0, 0), Square::A8);
        assert_eq!(to_square(7, 4), Square::E1);
        assert_eq!(to_square(0, 7), Square::H8);
    }

    #[test]
    fn test_move_uci_format() {
        assert_eq!(Move::new(Square::E2, Square::E4).to_uci(), "e2e4");
        let promo = Move::new(Square::E7, Square::E8).with_promotion(Role::Queen);
        assert_eq!(promo.to_uci(), "e7e8q");
    }

    #[test]
    fn test_move_parse() {
        let mv: Move = "g1f3".parse().unwrap();
        assert_eq!(mv, Move::new(Square::G1, Square::F3));

        let promo: Move = "a2a1N".parse().unwrap();
        assert_eq!(promo.promotion, Some(Role::Knight));

        assert!("e2".parse::<Move>().is_err());
        assert!("e2e9".parse::<Move>().is_err());
        assert!("e7e8k".parse::<Move>().is_err());
        assert!("(none)".parse::<Move>().is_err());
    }

    #[test]
    fn test_castle_reported_as_king_step() {
        let castle = shakmaty::Move::Castle {
            king: Square::E1,
            rook: Square::H1,
        };
        assert_eq!(
            Move::from_shakmaty(&castle),
            Some(Move::new(Square::E1, Square::G1))
        );

        let long = shakmaty::Move::Castle {
            king: Square::E8,
            rook: Square::A8,
        };
        assert_eq!(
            Move::from_shakmaty(&long),
            Some(Move::new(Square::E8, Square::C8))
        );
    }
}
