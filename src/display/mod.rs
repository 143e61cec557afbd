//! Display management
//!
//! - `geometry`: output layout, virtual-screen resolution, scale factor
//! - `x11`: X server connection, window, RandR/DPI discovery
//! - `present`: presentation swap (window background, PNG snapshots)

pub mod geometry;
pub mod present;
pub mod x11;

pub use geometry::GeometryProvider;
pub use present::{PngPresenter, Presenter, X11Presenter};
pub use x11::X11Display;
