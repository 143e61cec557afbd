//! Software drawing
//!
//! This module provides the CPU-side rasterizer used by the compositor:
//! - Coverage math for discs, rings, and arc wedges
//! - A premultiplied ARGB32 canvas with scaled shape operations
//!
//! Everything is drawn procedurally so frames can be built entirely
//! off-screen before they are handed to the window system.

pub mod canvas;
pub mod geometry;

pub use canvas::Canvas;
