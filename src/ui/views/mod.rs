mod board_view;
mod control_panel;
mod engine_pane;
mod move_list;

pub use board_view::ChessBoardView;
pub use control_panel::render_control_panel;
pub use engine_pane::render_engine_pane;
pub use move_list::render_move_list_panel;
