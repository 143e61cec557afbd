//! Lock session state
//!
//! The two state machines the indicator visualizes, plus the raw facts
//! they are rendered with. Input handlers and the authentication backend
//! write here; the compositor only reads.

use std::time::Instant;

/// Most recent keystroke category affecting the password buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InputState {
    /// No visible progress
    #[default]
    Idle,
    /// A character was appended
    KeyActive,
    /// A character was removed
    BackspaceActive,
    /// Backspace on an empty buffer
    NothingToDelete,
}

/// Authentication backend progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AuthState {
    #[default]
    Idle,
    /// Password submitted, waiting for the backend
    Verifying,
    /// Acquiring the lock
    Locking,
    /// Last attempt was rejected
    Wrong,
    /// The lock could not be acquired
    LockFailed,
}

impl InputState {
    pub const ALL: [InputState; 4] = [
        InputState::Idle,
        InputState::KeyActive,
        InputState::BackspaceActive,
        InputState::NothingToDelete,
    ];
}

impl AuthState {
    pub const ALL: [AuthState; 5] = [
        AuthState::Idle,
        AuthState::Verifying,
        AuthState::Locking,
        AuthState::Wrong,
        AuthState::LockFailed,
    ];
}

/// Mutable session state shared between the input handler, the auth
/// backend, and the redraw path
#[derive(Debug, Clone)]
pub struct SessionState {
    pub input: InputState,
    pub auth: AuthState,
    /// Rejected attempts since startup (never decreases)
    failed_attempts: u32,
    /// When the session was locked
    lock_start: Instant,
    /// Pressed modifiers captured with the last rejected attempt
    modifier_label: Option<String>,
}

impl SessionState {
    pub fn new(lock_start: Instant) -> Self {
        Self {
            input: InputState::Idle,
            auth: AuthState::Idle,
            failed_attempts: 0,
            lock_start,
            modifier_label: None,
        }
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn lock_start(&self) -> Instant {
        self.lock_start
    }

    pub fn modifier_label(&self) -> Option<&str> {
        self.modifier_label.as_deref()
    }

    /// Record a rejected attempt together with the modifiers held at the time
    pub fn record_failure(&mut self, modifier_label: Option<String>) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.auth = AuthState::Wrong;
        self.modifier_label = modifier_label.filter(|s| !s.is_empty());
    }

    /// Set the auth state; the modifier label only survives while `Wrong`
    pub fn set_auth(&mut self, auth: AuthState) {
        self.auth = auth;
        if auth != AuthState::Wrong {
            self.modifier_label = None;
        }
    }
}
