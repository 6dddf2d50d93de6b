//! Theme constants and colors for the chess UI.

use gpui::{Hsla, Rgba, rgb, rgba};

use crate::settings::Theme;

// Layout constants
pub const BOARD_PADDING: f32 = 20.0;
pub const PIECE_SCALE: f32 = 0.98; // piece size relative to square
pub const GHOST_OPACITY: f32 = 0.4;
pub const DOT_SCALE: f32 = 0.3;

// Initial panel sizes
pub const INITIAL_LEFT_PANEL: f32 = 520.0;
pub const INITIAL_RIGHT_PANEL: f32 = 340.0;

// Square overlays
pub const HIGHLIGHT: u32 = 0xffff0066;
pub const MOVE_DOT: u32 = 0x00000033;

// Panel colors
pub const PANEL_BG: u32 = 0x2a2a2a;
pub const MOVE_LIST_BG: u32 = 0x1e1e1e;
pub const BORDER_COLOR: u32 = 0x4a4a4a;
pub const TEXT_PRIMARY: u32 = 0xffffff;
pub const TEXT_SECONDARY: u32 = 0x888888;
pub const NOTICE_BG: u32 = 0x3b4a63;
pub const STATUS_TERMINAL: u32 = 0xfbbf24;

/// Light and dark square colors of a board palette
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub light: u32,
    pub dark: u32,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                light: 0xf0d9b5,
                dark: 0xb58863,
            },
            Theme::Dark => Self {
                light: 0xbac4ce,
                dark: 0x6c7a89,
            },
        }
    }

    /// Color of the square at `row`/`col` in screen space
    pub fn square_color(&self, row: usize, col: usize) -> Rgba {
        if (row + col) % 2 == 0 {
            rgb(self.light)
        } else {
            rgb(self.dark)
        }
    }
}

pub fn highlight_color() -> Hsla {
    rgba(HIGHLIGHT).into()
}

pub fn dot_color() -> Hsla {
    rgba(MOVE_DOT).into()
}
