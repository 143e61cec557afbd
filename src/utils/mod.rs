//! Utility functions shared across lockring
//!
//! Common helpers that don't fit in specialized modules.

pub mod color;

pub use color::{parse_hex_color, parse_hex_color_to_rgba, Rgba};
