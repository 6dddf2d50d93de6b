//! Square rendering component.

use crate::domain::Piece;
use crate::ui::components::render_piece;
use crate::ui::theme::{GHOST_OPACITY, Palette, dot_color, highlight_color};
use gpui::{div, prelude::*, px};

/// Everything needed to draw one square
#[derive(Clone, Copy, Debug)]
pub struct SquareView {
    pub row: usize,
    pub col: usize,
    pub piece: Option<Piece>,
    pub is_being_dragged: bool,
    /// Part of the last move, or the selected square
    pub highlighted: bool,
    /// Legal destination of the selected piece
    pub show_dot: bool,
}

/// Render a single board square with optional piece
pub fn render_square(
    square: SquareView,
    palette: Palette,
    square_size: f32,
    piece_size: f32,
    dot_size: f32,
) -> impl IntoElement {
    div()
        .flex_shrink_0() // never shrink - maintain aspect ratio
        .relative()
        .size(px(square_size))
        .bg(palette.square_color(square.row, square.col))
        .when(square.highlighted, |el| {
            el.child(div().absolute().size_full().bg(highlight_color()))
        })
        .when_some(square.piece, |el, p| {
            if square.is_being_dragged {
                // ghost piece on its origin square
                el.child(
                    div()
                        .absolute()
                        .size_full()
                        .opacity(GHOST_OPACITY)
                        .child(render_piece(p, piece_size)),
                )
            } else {
                el.child(div().absolute().size_full().child(render_piece(p, piece_size)))
            }
        })
        .when(square.show_dot, |el| {
            el.child(
                div()
                    .absolute()
                    .size_full()
                    .flex()
                    .items_center()
                    .justify_center()
                    .child(div().size(px(dot_size)).rounded_full().bg(dot_color())),
            )
        })
}
