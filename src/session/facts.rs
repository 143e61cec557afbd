//! Per-redraw displayable facts
//!
//! Derived from the session state at the moment a redraw runs. Nothing in
//! here is cached between frames; in particular the authorized-override
//! flag is recomputed from the elapsed time on every call.

use std::time::Instant;

use super::state::{AuthState, SessionState};

/// Facts the indicator renders, recomputed every redraw
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFacts {
    /// Whole seconds since the session was locked
    pub locked_secs: u64,
    pub failed_attempts: u32,
    /// Present only while the last attempt was rejected
    pub modifier_label: Option<String>,
    pub login: Option<String>,
    /// The lock has outlasted the authorized time
    pub authorized_override: bool,
}

impl SessionFacts {
    /// Snapshot the facts for a redraw happening at `now`
    ///
    /// `authorized_lock_minutes` is the threshold in whole minutes after
    /// which the override takes over.
    pub fn collect(
        state: &SessionState,
        login: Option<&str>,
        authorized_lock_minutes: u64,
        now: Instant,
    ) -> Self {
        let locked_secs = now.saturating_duration_since(state.lock_start()).as_secs();
        let modifier_label = match state.auth {
            AuthState::Wrong => state.modifier_label().map(str::to_string),
            _ => None,
        };
        Self {
            locked_secs,
            failed_attempts: state.failed_attempts(),
            modifier_label,
            login: login.filter(|l| !l.is_empty()).map(str::to_string),
            authorized_override: locked_secs / 60 >= authorized_lock_minutes,
        }
    }

    /// Elapsed time as `MM:SS`; minutes are not capped
    pub fn elapsed_label(&self) -> String {
        format!("{:02}:{:02}", self.locked_secs / 60, self.locked_secs % 60)
    }
}
