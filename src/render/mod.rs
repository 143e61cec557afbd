//! Surface compositor
//!
//! - `compositor`: background plus per-output placement of every surface
//! - `indicator`: the ring glyph with time, status, and highlight
//! - `panels`: modifier label panel and logout banner
//! - `palette`: ring color rules and status text
//! - `placement`: integer placement math
//! - `frame`: the finished image handed to a presenter

pub mod compositor;
pub mod frame;
pub mod indicator;
pub mod palette;
pub mod panels;
pub mod placement;

pub use compositor::{Background, Compositor, CompositorSettings};
pub use frame::{Frame, PanelKind};
