//! Chess board view - the board with click-to-move and drag-and-drop.

use gpui::{
    Context, Entity, MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels, Size,
    Subscription, Window, canvas, div, img, prelude::*, px, rgb,
};
use gpui_component::resizable::{h_resizable, resizable_panel};
use shakmaty::{Position, Square};
use tracing::debug;

use crate::domain::{Piece, shakmaty_to_piece};
use crate::models::{Session, SessionError};
use crate::settings::Theme;
use crate::ui::board_layout::BoardLayout;
use crate::ui::components::{SquareView, render_square};
use crate::ui::theme::{BOARD_PADDING, INITIAL_LEFT_PANEL, INITIAL_RIGHT_PANEL, PANEL_BG, Palette};
use crate::ui::views::{render_control_panel, render_engine_pane, render_move_list_panel};

/// State for a piece being dragged
#[derive(Clone, Copy, Debug)]
struct DragState {
    piece: Piece,
    from: Square,
    /// Mouse position relative to window
    mouse_x: f32,
    mouse_y: f32,
}

/// The main view. Owns presentation state only; the game lives in the session.
pub struct ChessBoardView {
    session: Entity<Session>,
    theme: Theme,
    panel_size: Size<Pixels>,
    drag_state: Option<DragState>,
    selected: Option<Square>,
    targets: Vec<Square>,
    _subscription: Subscription,
}

impl ChessBoardView {
    pub fn new(session: Entity<Session>, theme: Theme, cx: &mut Context<Self>) -> Self {
        let _subscription = cx.observe(&session, |view, session, cx| {
            // A move made elsewhere (AI, sync) invalidates the selection
            if !session.read(cx).accepts_input() {
                view.clear_selection();
            }
            cx.notify();
        });
        Self {
            session,
            theme,
            panel_size: BoardLayout::default().panel_size,
            drag_state: None,
            selected: None,
            targets: Vec::new(),
            _subscription,
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    fn layout(&self, cx: &Context<Self>) -> BoardLayout {
        BoardLayout::new(self.panel_size, self.session.read(cx).local_color())
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.targets.clear();
    }

    fn try_move(&mut self, from: Square, to: Square, cx: &mut Context<Self>) {
        self.clear_selection();
        let result = self.session.update(cx, |session, cx| {
            let result = session.on_user_move_intent(from, to);
            cx.notify();
            result
        });
        match result {
            Ok(()) => {}
            Err(SessionError::IllegalMove(mv)) => debug!(%mv, "move rejected"),
            Err(e) => debug!(error = %e, "input ignored"),
        }
    }

    fn on_press(&mut self, square: Square, mouse_x: f32, mouse_y: f32, cx: &mut Context<Self>) {
        if let Some(from) = self.selected.filter(|_| self.targets.contains(&square)) {
            self.try_move(from, square, cx);
            return;
        }

        let session = self.session.read(cx);
        let targets = session.on_square_selected(square);
        let piece = session.position().board().piece_at(square);
        match piece {
            Some(piece) if !targets.is_empty() => {
                self.selected = Some(square);
                self.targets = targets;
                self.drag_state = Some(DragState {
                    piece: shakmaty_to_piece(piece),
                    from: square,
                    mouse_x,
                    mouse_y,
                });
            }
            _ => self.clear_selection(),
        }
    }

    fn on_release(&mut self, square: Option<Square>, cx: &mut Context<Self>) {
        let Some(drag) = self.drag_state.take() else {
            return;
        };
        match square {
            // Released where it started: keep the selection for click-to-move
            Some(to) if to == drag.from => {}
            Some(to) if self.targets.contains(&to) => self.try_move(drag.from, to, cx),
            _ => self.clear_selection(),
        }
    }
}

impl Render for ChessBoardView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let entity = cx.entity().clone();
        let entity_down = entity.clone();
        let entity_move = entity.clone();
        let entity_up = entity.clone();
        let entity_measure = entity.clone();

        let layout = self.layout(cx);
        let palette = Palette::for_theme(self.theme);
        let square_size = layout.square_size();
        let piece_size = layout.piece_size();
        let dot_size = layout.dot_size();
        let board_total_size = layout.board_total_size();

        let session = self.session.read(cx);
        let position = session.position();
        let last_move = session.last_move();
        let dragging_from = self.drag_state.map(|d| d.from);

        // Floating piece follows cursor during drag
        let floating_piece = self.drag_state.map(|d| {
            div()
                .absolute()
                .left(px(d.mouse_x - piece_size / 2.0))
                .top(px(d.mouse_y - piece_size / 2.0))
                .size(px(piece_size))
                .child(img(d.piece.svg_path()).size(px(piece_size)))
        });

        let squares: Vec<SquareView> = (0..8)
            .flat_map(|row| (0..8).map(move |col| (row, col)))
            .map(|(row, col)| {
                let square = layout.square_at(row, col);
                let on_last_move = last_move.is_some_and(|m| m.from == square || m.to == square);
                SquareView {
                    row,
                    col,
                    piece: position.board().piece_at(square).map(shakmaty_to_piece),
                    is_being_dragged: dragging_from == Some(square),
                    highlighted: on_last_move || self.selected == Some(square),
                    show_dot: self.targets.contains(&square),
                }
            })
            .collect();

        let board = div()
            .flex_shrink_0()
            .flex()
            .flex_col()
            .w(px(board_total_size))
            .h(px(board_total_size))
            .overflow_hidden()
            .rounded_md()
            .children((0..8).map(|row| {
                div().flex().flex_shrink_0().children((0..8).map(|col| {
                    render_square(squares[row * 8 + col], palette, square_size, piece_size, dot_size)
                }))
            }));

        let board_panel_content = div()
            .id("board-panel")
            .relative()
            .size_full()
            .overflow_hidden()
            .bg(rgb(PANEL_BG))
            .p(px(BOARD_PADDING))
            .child(board)
            .when_some(floating_piece, |el, fp| el.child(fp))
            // Mouse down: select, move to a marked square, or start a drag
            .on_mouse_down(
                MouseButton::Left,
                move |ev: &MouseDownEvent, _window, cx| {
                    entity_down.update(cx, |board, cx| {
                        let pos = ev.position;
                        let (x, y): (f32, f32) = (pos.x.into(), pos.y.into());
                        if let Some(square) = board.layout(cx).pos_to_square(x, y) {
                            board.on_press(square, x, y, cx);
                        } else {
                            board.clear_selection();
                        }
                        cx.notify();
                    });
                },
            )
            // Mouse move: update drag position
            .on_mouse_move(move |ev: &MouseMoveEvent, _, cx| {
                entity_move.update(cx, |board, cx| {
                    if let Some(ref mut drag) = board.drag_state {
                        drag.mouse_x = ev.position.x.into();
                        drag.mouse_y = ev.position.y.into();
                        cx.notify();
                    }
                });
            })
            // Mouse up: complete the drag
            .on_mouse_up(MouseButton::Left, move |ev: &MouseUpEvent, _window, cx| {
                entity_up.update(cx, |board, cx| {
                    let pos = ev.position;
                    let square = board.layout(cx).pos_to_square(pos.x.into(), pos.y.into());
                    board.on_release(square, cx);
                    cx.notify();
                });
            });

        // Canvas to measure actual panel size
        let measure_canvas = canvas(
            move |bounds, _window, cx| {
                entity_measure.update(cx, |board, cx| {
                    if board.panel_size != bounds.size {
                        board.panel_size = bounds.size;
                        cx.notify();
                    }
                });
            },
            |_, _, _, _| {},
        )
        .absolute()
        .top_0()
        .left_0()
        .size_full();

        let board_panel_with_measure = div()
            .relative()
            .size_full()
            .child(measure_canvas)
            .child(board_panel_content);

        let side_panel = div()
            .size_full()
            .flex()
            .flex_col()
            .overflow_hidden()
            .bg(rgb(PANEL_BG))
            .child(render_control_panel(&self.session, &entity, self.theme, cx))
            .child(render_move_list_panel(&self.session, cx))
            .child(render_engine_pane(&self.session, cx));

        div().size_full().font_family("Berkeley Mono").child(
            h_resizable("chess-layout")
                .child(
                    resizable_panel()
                        .size(px(INITIAL_LEFT_PANEL))
                        .size_range(px(320.)..px(1200.))
                        .child(board_panel_with_measure),
                )
                .child(
                    resizable_panel()
                        .size(px(INITIAL_RIGHT_PANEL))
                        .size_range(px(240.)..Pixels::MAX)
                        .child(side_panel),
                ),
        )
    }
}
