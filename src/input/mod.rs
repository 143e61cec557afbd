//! Input handling
//!
//! - `keycodes`: evdev key constants and the X11 keycode mapping
//! - `preview`: key presses to session state for the preview window

pub mod keycodes;
pub mod preview;

pub use preview::{KeyAction, Modifiers, PreviewInput};
