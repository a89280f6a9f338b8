//! Cursor, edit-mode overlay, keyboard-to-note mapping, and cell mutation
//! (C7 Editor).

pub mod cursor;
pub mod editor;
pub mod key;
pub mod repeat;

pub use cursor::Cursor;
pub use editor::Editor;
pub use key::{InputOracle, Key, Modifiers};
pub use repeat::KeyRepeat;
