//! Linear move history for a game session.
//!
//! This is a pure domain module with no GPUI dependencies.

use shakmaty::{Chess, Position};

use crate::domain::chess::Move;
use crate::domain::codec::{INITIAL_CODE, encode};
use crate::domain::rules::repetition_key;

/// A position reached by playing a move
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// The chess position after the move
    pub position: Chess,
    /// The move that led to this position
    pub mv: Move,
    /// SAN notation of the move
    pub san: String,
    /// Repetition identity of `position`
    key: String,
}

impl HistoryEntry {
    pub fn new(position: Chess, mv: Move, san: String) -> Self {
        let key = repetition_key(&encode(&position));
        Self {
            position,
            mv,
            san,
            key,
        }
    }
}

/// One numbered row of the move list: white's move and black's reply
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePair {
    pub number: usize,
    pub white: Option<String>,
    pub black: Option<String>,
}

/// Chronological list of moves anchored on a starting position
#[derive(Clone, Debug)]
pub struct History {
    /// Position before any recorded move
    initial: Chess,
    initial_key: String,
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Create a history starting from the standard position
    pub fn new() -> Self {
        Self {
            initial: Chess::default(),
            initial_key: repetition_key(INITIAL_CODE),
            entries: Vec::new(),
        }
    }

    /// Create a history starting from an arbitrary position
    pub fn from_position(initial: Chess) -> Self {
        let initial_key = repetition_key(&encode(&initial));
        Self {
            initial,
            initial_key,
            entries: Vec::new(),
        }
    }

    /// The position after the most recent move
    pub fn current(&self) -> &Chess {
        self.entries
            .last()
            .map(|e| &e.position)
            .unwrap_or(&self.initial)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent move, for highlighting
    pub fn last_move(&self) -> Option<Move> {
        self.entries.last().map(|e| e.mv)
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Remove up to `count` moves from the end, returning how many were removed
    pub fn pop(&mut self, count: usize) -> usize {
        let removed = count.min(self.entries.len());
        self.entries.truncate(self.entries.len() - removed);
        removed
    }

    /// How many times the current position has occurred, including now
    pub fn repetitions(&self) -> usize {
        let current = self
            .entries
            .last()
            .map(|e| e.key.as_str())
            .unwrap_or(self.initial_key.as_str());
        let earlier = self
            .entries
            .iter()
            .rev()
            .skip(1)
            .filter(|e| e.key == current)
            .count();
        let initial = usize::from(!self.entries.is_empty() && self.initial_key == current);
        1 + earlier + initial
    }

    /// Moves grouped into numbered pairs for display.
    ///
    /// Numbering follows the order moves were recorded, so a history that
    /// starts with black to move shows an empty white slot first.
    pub fn move_pairs(&self) -> Vec<MovePair> {
        let offset = usize::from(self.initial.turn().is_black());
        let first_number = self.initial.fullmoves().get() as usize;

        let mut slots: Vec<Option<String>> = vec![None; offset];
        slots.extend(self.entries.iter().map(|e| Some(e.san.clone())));

        slots
            .chunks(2)
            .enumerate()
            .map(|(i, chunk)| MovePair {
                number: first_number + i,
                white: chunk.first().cloned().flatten(),
                black: chunk.get(1).cloned().flatten(),
            })
            .collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
