//! Board layout calculations - handles sizing, orientation and coordinate transformations.

use crate::domain::to_square;
use crate::ui::theme::{BOARD_PADDING, DOT_SCALE, PIECE_SCALE};
use gpui::{Pixels, Size, px};
use shakmaty::{Color, Square};

/// Handles all layout calculations for the chess board.
///
/// Screen rows and columns count from the top-left corner as drawn. With
/// Black at the bottom the board is rotated half a turn.
#[derive(Clone, Copy, Debug)]
pub struct BoardLayout {
    pub panel_size: Size<Pixels>,
    pub bottom: Color,
}

impl BoardLayout {
    pub fn new(panel_size: Size<Pixels>, bottom: Color) -> Self {
        Self { panel_size, bottom }
    }

    /// Calculate square size from measured panel dimensions
    pub fn square_size(&self) -> f32 {
        let panel_width: f32 = self.panel_size.width.into();
        let panel_height: f32 = self.panel_size.height.into();
        let available_width = panel_width - BOARD_PADDING * 2.0;
        let available_height = panel_height - BOARD_PADDING * 2.0;
        (available_width.min(available_height) / 8.0).max(30.0)
    }

    pub fn piece_size(&self) -> f32 {
        self.square_size() * PIECE_SCALE
    }

    pub fn dot_size(&self) -> f32 {
        self.square_size() * DOT_SCALE
    }

    pub fn board_total_size(&self) -> f32 {
        self.square_size() * 8.0
    }

    /// Square drawn at a screen row/col
    pub fn square_at(&self, row: usize, col: usize) -> Square {
        match self.bottom {
            Color::White => to_square(row, col),
            Color::Black => to_square(7 - row, 7 - col),
        }
    }

    /// Convert a position relative to the board panel to a square (if within board)
    pub fn pos_to_square(&self, x: f32, y: f32) -> Option<Square> {
        let board_x = x - BOARD_PADDING;
        let board_y = y - BOARD_PADDING;

        if board_x < 0.0 || board_y < 0.0 {
            return None;
        }

        let square_size = self.square_size();
        let col = (board_x / square_size) as usize;
        let row = (board_y / square_size) as usize;

        if row < 8 && col < 8 {
            Some(self.square_at(row, col))
        } else {
            None
        }
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::new(
            Size {
                width: px(520.0),
                height: px(600.0),
            },
            Color::White,
        )
    }
}
