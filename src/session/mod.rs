//! Lock session state store
//!
//! - `state`: input/auth state machines and raw counters (written externally)
//! - `facts`: values derived from the state for a single redraw
//! - `signals`: shutdown signal flag for the event loop

pub mod facts;
pub mod signals;
pub mod state;

pub use facts::SessionFacts;
pub use state::{AuthState, InputState, SessionState};
