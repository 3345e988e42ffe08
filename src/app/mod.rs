pub mod keymap;
mod state;
mod types;

pub use types::{App, InputMode, RenameForm};
