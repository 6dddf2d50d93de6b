//! Pure chess logic: no threads, no UI.

pub mod chess;
pub mod codec;
pub mod evaluation;
pub mod history;
pub mod rules;
pub mod search;
pub mod uci;

pub use chess::{Move, ParseMoveError, Piece, PieceColor, PieceKind, shakmaty_to_piece, to_square};
pub use codec::{CodecError, INITIAL_CODE, decode, encode};
pub use evaluation::evaluate_position;
pub use history::{History, HistoryEntry, MovePair};
pub use rules::{DrawReason, GameStatus, IllegalMove};
pub use search::{DEFAULT_SEARCH_DEPTH, SearchResult, search_best_move};
pub use uci::{UciCommand, UciOutput, UciOutputKind};
