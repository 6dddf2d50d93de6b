//! Move list panel - the game's moves as numbered pairs.

use gpui::{App, Div, Entity, div, prelude::*, px, rgb};

use crate::domain::MovePair;
use crate::models::Session;
use crate::ui::theme::{BOARD_PADDING, BORDER_COLOR, MOVE_LIST_BG, TEXT_PRIMARY, TEXT_SECONDARY};

const LAST_MOVE_BG: u32 = 0x4a6da7;

/// Render the move list panel for a session
pub fn render_move_list_panel(session: &Entity<Session>, cx: &App) -> Div {
    let history = session.read(cx).history();
    let pairs = history.move_pairs();
    let last_index = pairs.len().saturating_sub(1);
    let black_moved_last = pairs.last().is_some_and(|p| p.black.is_some());

    let moves_content = if pairs.is_empty() {
        div()
            .text_color(rgb(TEXT_SECONDARY))
            .text_sm()
            .child("No moves yet")
    } else {
        div().flex().flex_col().gap_1().children(
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, pair)| render_pair(pair, i == last_index, black_moved_last)),
        )
    };

    let move_list = div()
        .flex_1()
        .flex()
        .flex_col()
        .bg(rgb(MOVE_LIST_BG))
        .border_1()
        .border_color(rgb(BORDER_COLOR))
        .rounded_md()
        .overflow_hidden()
        // Header (fixed)
        .child(
            div()
                .p_4()
                .pb_2()
                .text_color(rgb(TEXT_PRIMARY))
                .border_b_1()
                .border_color(rgb(BORDER_COLOR))
                .child("Move History"),
        )
        // Scrollable moves content
        .child(
            div()
                .id("move-list-scroll")
                .flex_1()
                .overflow_y_scroll()
                .p_4()
                .pt_2()
                .child(moves_content),
        );

    div()
        .flex_1()
        .min_h_0()
        .flex()
        .flex_col()
        .px(px(BOARD_PADDING))
        .pb_2()
        .child(move_list)
}

fn render_pair(pair: MovePair, is_last: bool, black_moved_last: bool) -> impl IntoElement {
    let white_is_last = is_last && !black_moved_last;
    let black_is_last = is_last && black_moved_last;

    div()
        .flex()
        .items_center()
        .gap_2()
        .py_1()
        .child(
            div()
                .text_color(rgb(TEXT_SECONDARY))
                .text_sm()
                .w(px(40.0))
                .child(format!("{}.", pair.number)),
        )
        .child(render_san(pair.white.unwrap_or_else(|| "...".to_string()), white_is_last))
        .when_some(pair.black, |el, san| el.child(render_san(san, black_is_last)))
}

fn render_san(san: String, is_last: bool) -> impl IntoElement {
    div()
        .flex_1()
        .px_1()
        .rounded(px(3.0))
        .text_color(rgb(TEXT_PRIMARY))
        .text_sm()
        .when(is_last, |el| el.bg(rgb(LAST_MOVE_BG)))
        .child(san)
}
