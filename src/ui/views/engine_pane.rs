//! Engine pane - raw output of the simulated engine behind the strong tier.

use gpui::{App, Entity, SharedString, div, prelude::*, px, rgb};

use crate::models::{Session, Tier};
use crate::ui::theme::{BOARD_PADDING, BORDER_COLOR, MOVE_LIST_BG, TEXT_PRIMARY, TEXT_SECONDARY};

const STATUS_THINKING: u32 = 0xfbbf24;
const STATUS_IDLE: u32 = 0x4ade80;
const STATUS_STOPPED: u32 = 0xf87171;
const VISIBLE_LINES: usize = 30;

/// Render the engine pane. Hidden unless the strong tier is selected.
pub fn render_engine_pane(session: &Entity<Session>, cx: &App) -> impl IntoElement {
    let session = session.read(cx);
    let visible = session.tier() == Tier::Strong;
    let output = session.engine_output();

    let (status_text, status_color) = if session.is_busy() {
        ("Thinking...", STATUS_THINKING)
    } else if session.engine_running() {
        ("Ready", STATUS_IDLE)
    } else {
        ("Stopped", STATUS_STOPPED)
    };

    let content = if output.is_empty() {
        div()
            .text_color(rgb(TEXT_SECONDARY))
            .text_xs()
            .child("No output yet...")
    } else {
        // Most recent first
        div().flex().flex_col().gap_px().children(
            output
                .iter()
                .rev()
                .take(VISIBLE_LINES)
                .enumerate()
                .map(|(i, line)| {
                    div()
                        .id(SharedString::from(format!("engine-line-{}", i)))
                        .text_xs()
                        .text_color(rgb(TEXT_SECONDARY))
                        .overflow_hidden()
                        .text_ellipsis()
                        .child(line.raw.clone())
                }),
        )
    };

    let pane = div()
        .h(px(180.0))
        .flex()
        .flex_col()
        .bg(rgb(MOVE_LIST_BG))
        .border_1()
        .border_color(rgb(BORDER_COLOR))
        .rounded_md()
        .overflow_hidden()
        .child(
            div()
                .flex_shrink_0()
                .flex()
                .items_center()
                .gap_2()
                .px_4()
                .py_2()
                .border_b_1()
                .border_color(rgb(BORDER_COLOR))
                .child(
                    div()
                        .text_color(rgb(TEXT_PRIMARY))
                        .font_weight(gpui::FontWeight::SEMIBOLD)
                        .child("Engine"),
                )
                .child(div().text_xs().text_color(rgb(status_color)).child(status_text)),
        )
        .child(
            div()
                .id("engine-raw-output-scroll")
                .flex_1()
                .min_h_0()
                .overflow_y_scroll()
                .px_4()
                .py_2()
                .child(content),
        );

    div()
        .flex_shrink_0()
        .px(px(BOARD_PADDING))
        .pb(px(BOARD_PADDING))
        .when(visible, |el| el.child(pane))
}
