//! Control panel - mode and tier selection, game actions, remote play and status.

use gpui::{App, ClipboardItem, Entity, SharedString, div, prelude::*, px, rgb};
use gpui_component::button::{Button, ButtonVariants};
use shakmaty::Color;
use tracing::debug;

use crate::models::{Mode, Phase, Session, Tier};
use crate::settings::Theme;
use crate::ui::theme::{BOARD_PADDING, NOTICE_BG, STATUS_TERMINAL, TEXT_PRIMARY, TEXT_SECONDARY};
use crate::ui::views::ChessBoardView;

fn copy_to_clipboard(text: String, cx: &mut App) {
    cx.write_to_clipboard(ClipboardItem::new_string(text));
}

fn paste_from_clipboard(cx: &mut App) -> Option<String> {
    cx.read_from_clipboard()
        .and_then(|item| item.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// A selector button, highlighted when it holds the current value
fn choice_button(id: impl Into<SharedString>, label: &'static str, selected: bool) -> Button {
    let button = Button::new(id.into()).label(label).compact();
    if selected { button.primary() } else { button }
}

fn section_label(text: &'static str) -> impl IntoElement {
    div().text_xs().text_color(rgb(TEXT_SECONDARY)).child(text)
}

/// Render the control panel for a session
pub fn render_control_panel(
    session: &Entity<Session>,
    board: &Entity<ChessBoardView>,
    theme: Theme,
    cx: &App,
) -> impl IntoElement {
    let state = session.read(cx);
    let mode = state.mode();
    let tier = state.tier();
    let player_color = state.player_color();
    let is_busy = state.is_busy();
    let can_undo = state.can_undo();
    let status_text = state.status_text();
    let is_terminal = state.phase() == Phase::Terminal;
    let notification = state.notification().map(|n| n.to_string());
    let code = state.code().map(|c| c.to_string());

    let mode_row = div().flex().flex_wrap().gap_1().children(Mode::ALL.iter().map(|&m| {
        let session = session.clone();
        choice_button(format!("mode-{:?}", m), m.label(), m == mode).on_click(move |_, _, cx| {
            session.update(cx, |session, cx| {
                session.set_mode(m);
                cx.notify();
            });
        })
    }));

    let tier_row = div().flex().flex_wrap().gap_1().children(Tier::ALL.iter().map(|&t| {
        let session = session.clone();
        choice_button(format!("tier-{:?}", t), t.label(), t == tier).on_click(move |_, _, cx| {
            session.update(cx, |session, cx| {
                session.set_tier(t);
                cx.notify();
            });
        })
    }));

    let color_row = div().flex().gap_1().children(
        [(Color::White, "Play White"), (Color::Black, "Play Black")]
            .into_iter()
            .map(|(color, label)| {
                let session = session.clone();
                choice_button(format!("color-{:?}", color), label, color == player_color)
                    .on_click(move |_, _, cx| {
                        session.update(cx, |session, cx| {
                            session.set_player_color(color);
                            cx.notify();
                        });
                    })
            }),
    );

    let session_new = session.clone();
    let session_undo = session.clone();
    let session_share = session.clone();
    let board_theme = board.clone();
    let theme_label = match theme {
        Theme::Light => "Dark Board",
        Theme::Dark => "Light Board",
    };

    let actions = div()
        .flex()
        .flex_wrap()
        .gap_1()
        .child(
            Button::new("new-game")
                .label("New Game")
                .primary()
                .compact()
                .on_click(move |_, _, cx| {
                    session_new.update(cx, |session, cx| {
                        session.reset();
                        cx.notify();
                    });
                }),
        )
        .when(can_undo, |el| {
            el.child(Button::new("undo").label("Undo").compact().on_click(move |_, _, cx| {
                session_undo.update(cx, |session, cx| {
                    match session.undo() {
                        Ok(removed) => debug!(removed, "undo from panel"),
                        Err(e) => debug!(error = %e, "undo rejected"),
                    }
                    cx.notify();
                });
            }))
        })
        .child(
            Button::new("share-code")
                .label("Share Code")
                .compact()
                .on_click(move |_, _, cx| {
                    let fen = session_share.read(cx).fen();
                    copy_to_clipboard(fen, cx);
                    session_share.update(cx, |session, cx| {
                        session.notify("Position code copied to the clipboard.");
                        cx.notify();
                    });
                }),
        )
        .child(
            Button::new("toggle-theme")
                .label(theme_label)
                .compact()
                .on_click(move |_, _, cx| {
                    board_theme.update(cx, |board, cx| {
                        board.toggle_theme();
                        cx.notify();
                    });
                }),
        );

    let session_create = session.clone();
    let session_join = session.clone();
    let session_sync = session.clone();

    let remote = div()
        .flex()
        .flex_wrap()
        .gap_1()
        .child(
            Button::new("remote-create")
                .label("Create Game")
                .compact()
                .on_click(move |_, _, cx| {
                    let code = session_create.update(cx, |session, cx| {
                        let code = session.create_remote_game();
                        cx.notify();
                        code
                    });
                    copy_to_clipboard(code, cx);
                }),
        )
        .child(
            Button::new("remote-join")
                .label("Join from Clipboard")
                .compact()
                .on_click(move |_, _, cx| {
                    let pasted = paste_from_clipboard(cx);
                    session_join.update(cx, |session, cx| {
                        match pasted {
                            Some(code) => {
                                if let Err(e) = session.join_remote_game(&code) {
                                    debug!(error = %e, "join failed");
                                }
                            }
                            None => session.notify("Invalid Game Code."),
                        }
                        cx.notify();
                    });
                }),
        )
        .when(mode == Mode::RemotePeer, |el| {
            el.child(
                Button::new("remote-sync")
                    .label("Sync from Clipboard")
                    .compact()
                    .on_click(move |_, _, cx| {
                        let pasted = paste_from_clipboard(cx);
                        session_sync.update(cx, |session, cx| {
                            match pasted {
                                Some(code) => {
                                    if let Err(e) = session.sync_remote(&code) {
                                        debug!(error = %e, "sync failed");
                                    }
                                }
                                None => session.notify("Invalid code from friend."),
                            }
                            cx.notify();
                        });
                    }),
            )
        })
        .when_some(code.clone(), |el, code| {
            el.child(
                Button::new("remote-copy")
                    .label("Copy Code")
                    .compact()
                    .on_click(move |_, _, cx| {
                        copy_to_clipboard(code.clone(), cx);
                    }),
            )
        });

    let status = div()
        .flex()
        .items_center()
        .gap_2()
        .child(
            div()
                .font_weight(gpui::FontWeight::BOLD)
                .text_color(if is_terminal {
                    rgb(STATUS_TERMINAL)
                } else {
                    rgb(TEXT_PRIMARY)
                })
                .child(status_text),
        )
        .when(is_busy, |el| {
            el.child(
                div()
                    .text_sm()
                    .text_color(rgb(TEXT_SECONDARY))
                    .child("AI is thinking..."),
            )
        });

    div()
        .flex_shrink_0()
        .flex()
        .flex_col()
        .gap_2()
        .p(px(BOARD_PADDING))
        .child(status)
        .when_some(notification, |el, message| {
            el.child(
                div()
                    .px_3()
                    .py_2()
                    .rounded_md()
                    .bg(rgb(NOTICE_BG))
                    .text_sm()
                    .text_color(rgb(TEXT_PRIMARY))
                    .child(message),
            )
        })
        .child(section_label("Mode"))
        .child(mode_row)
        .when(mode == Mode::Ai, |el| {
            el.child(section_label("Difficulty"))
                .child(tier_row)
                .child(color_row)
        })
        .child(section_label("Game"))
        .child(actions)
        .child(section_label("Play with a friend"))
        .child(remote)
        .when_some(code, |el, code| {
            el.child(
                div()
                    .text_xs()
                    .text_color(rgb(TEXT_SECONDARY))
                    .overflow_hidden()
                    .text_ellipsis()
                    .child(code),
            )
        })
}
