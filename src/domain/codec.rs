//! Position codec: the text code exchanged between peers is a FEN string.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode};
use thiserror::Error;

/// Code of the standard starting position
pub const INITIAL_CODE: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed position code: {0}")]
    Malformed(String),
    #[error("position code describes an impossible position: {0}")]
    Illegal(String),
}

/// Serialize a position to its code
pub fn encode(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Parse a code back into a position, rejecting malformed or impossible ones
pub fn decode(code: &str) -> Result<Chess, CodecError> {
    let fen: Fen = code
        .trim()
        .parse()
        .map_err(|e| CodecError::Malformed(format!("{e}")))?;
    fen.into_position(CastlingMode::Standard)
        .map_err(|e| CodecError::Illegal(format!("{e}")))
}
