//! Terminal player front-end.
pub mod model;
pub mod render;


pub use model::{FocusLine, StandingRow, UiData};
pub use render::{Ui, UiActions, UiTerminal, draw_frame, setup_render_ui};
