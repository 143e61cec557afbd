//! Font loading and text rendering
//!
//! Handles:
//! - System font discovery (fontconfig)
//! - TTF/OTF loading and rasterization (fontdue)
//! - Ink-box text measurement for centered layout

pub mod fontconfig;
pub mod text;

pub use fontconfig::load_configured_font;
pub use text::{FontdueFace, TextExtents, Typeface};
