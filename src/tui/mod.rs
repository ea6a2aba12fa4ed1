mod handler;
mod ui;

pub use handler::{handle_key_event, AppAction, KeyContext};
pub use ui::draw;
