//! Preview keyboard handling
//!
//! Drives the session state from key presses so the indicator can be
//! exercised without an authentication backend. Only the length of the
//! typed buffer is tracked; key content is never stored.

use bitflags::bitflags;
use log::debug;

use super::keycodes::{
    function_key_number, is_modifier_key, is_printable_key, KEY_BACKSPACE, KEY_ENTER, KEY_ESC,
    KEY_KPENTER,
};
use crate::session::{AuthState, InputState, SessionState};

bitflags! {
    /// Held modifiers, laid out like the X11 key event state mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u16 {
        const SHIFT     = 1 << 0;
        const CAPS_LOCK = 1 << 1;
        const CONTROL   = 1 << 2;
        const ALT       = 1 << 3;  // Mod1
        const NUM_LOCK  = 1 << 4;  // Mod2
        const SUPER     = 1 << 6;  // Mod4
    }
}

impl Modifiers {
    /// From an X11 key event state (mouse buttons and other bits dropped)
    pub fn from_x11_state(state: u16) -> Self {
        Self::from_bits_truncate(state)
    }

    /// Human-readable list, e.g. `Caps Lock, Num Lock` (None if empty)
    pub fn label(self) -> Option<String> {
        const NAMES: [(Modifiers, &str); 6] = [
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::CAPS_LOCK, "Caps Lock"),
            (Modifiers::CONTROL, "Control"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::NUM_LOCK, "Num Lock"),
            (Modifiers::SUPER, "Super"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(names.join(", "))
        }
    }
}

/// What the caller should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing changed
    Ignored,
    /// State changed; redraw. `arm_clear` restarts the feedback timeout.
    Redraw { arm_clear: bool },
    /// Buffer discarded; hide the indicator feedback
    Clear,
}

/// Simulated password entry
#[derive(Debug, Default)]
pub struct PreviewInput {
    buffer_len: usize,
}

impl PreviewInput {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// Apply one key press (evdev code) to the session state
    pub fn handle_key(
        &mut self,
        keycode: u32,
        mods: Modifiers,
        state: &mut SessionState,
    ) -> KeyAction {
        if is_modifier_key(keycode) {
            return KeyAction::Ignored;
        }

        if let Some(n) = function_key_number(keycode) {
            let auth = match n {
                1 => AuthState::Idle,
                2 => AuthState::Verifying,
                3 => AuthState::Locking,
                4 => AuthState::Wrong,
                _ => AuthState::LockFailed,
            };
            debug!("Preview: auth state forced to {:?}", auth);
            state.set_auth(auth);
            return KeyAction::Redraw { arm_clear: false };
        }

        match keycode {
            KEY_ESC => {
                self.buffer_len = 0;
                KeyAction::Clear
            }
            KEY_ENTER | KEY_KPENTER => {
                debug!("Preview: rejecting {}-character attempt", self.buffer_len);
                self.buffer_len = 0;
                state.input = InputState::Idle;
                state.record_failure(mods.label());
                KeyAction::Redraw { arm_clear: false }
            }
            KEY_BACKSPACE => {
                if self.buffer_len == 0 {
                    state.input = InputState::NothingToDelete;
                } else {
                    self.buffer_len -= 1;
                    state.input = InputState::BackspaceActive;
                }
                KeyAction::Redraw { arm_clear: true }
            }
            k if is_printable_key(k) => {
                self.buffer_len += 1;
                state.input = InputState::KeyActive;
                KeyAction::Redraw { arm_clear: true }
            }
            _ => KeyAction::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keycodes::{KEY_F2, KEY_F4, KEY_LEFTSHIFT};
    use std::time::Instant;

    const KEY_A: u32 = 30;

    #[test]
    fn test_modifier_label() {
        assert_eq!(Modifiers::empty().label(), None);
        assert_eq!(
            Modifiers::from_x11_state(0x0002 | 0x0010).label().as_deref(),
            Some("Caps Lock, Num Lock")
        );
        // Button masks are ignored
        assert_eq!(Modifiers::from_x11_state(0x0100 | 0x0001), Modifiers::SHIFT);
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = PreviewInput::new();
        let mut state = SessionState::new(Instant::now());

        assert_eq!(
            input.handle_key(KEY_A, Modifiers::empty(), &mut state),
            KeyAction::Redraw { arm_clear: true }
        );
        assert_eq!(state.input, InputState::KeyActive);
        assert_eq!(input.buffer_len(), 1);

        input.handle_key(KEY_BACKSPACE, Modifiers::empty(), &mut state);
        assert_eq!(state.input, InputState::BackspaceActive);
        input.handle_key(KEY_BACKSPACE, Modifiers::empty(), &mut state);
        assert_eq!(state.input, InputState::NothingToDelete);
        assert_eq!(input.buffer_len(), 0);
    }

    #[test]
    fn test_return_records_failure_with_modifiers() {
        let mut input = PreviewInput::new();
        let mut state = SessionState::new(Instant::now());
        input.handle_key(KEY_A, Modifiers::empty(), &mut state);
        input.handle_key(KEY_ENTER, Modifiers::CAPS_LOCK, &mut state);

        assert_eq!(state.auth, AuthState::Wrong);
        assert_eq!(state.failed_attempts(), 1);
        assert_eq!(state.modifier_label(), Some("Caps Lock"));
        assert_eq!(input.buffer_len(), 0);
    }

    #[test]
    fn test_function_keys_force_auth() {
        let mut input = PreviewInput::new();
        let mut state = SessionState::new(Instant::now());
        input.handle_key(KEY_F2, Modifiers::empty(), &mut state);
        assert_eq!(state.auth, AuthState::Verifying);
        input.handle_key(KEY_F4, Modifiers::empty(), &mut state);
        assert_eq!(state.auth, AuthState::Wrong);
        assert_eq!(state.failed_attempts(), 0);
    }

    #[test]
    fn test_escape_and_modifiers() {
        let mut input = PreviewInput::new();
        let mut state = SessionState::new(Instant::now());
        assert_eq!(
            input.handle_key(KEY_LEFTSHIFT, Modifiers::SHIFT, &mut state),
            KeyAction::Ignored
        );
        input.handle_key(KEY_A, Modifiers::empty(), &mut state);
        assert_eq!(
            input.handle_key(KEY_ESC, Modifiers::empty(), &mut state),
            KeyAction::Clear
        );
        assert_eq!(input.buffer_len(), 0);
    }
}
