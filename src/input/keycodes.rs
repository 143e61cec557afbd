//! evdev keycode constants
//!
//! Linux input event codes from <linux/input-event-codes.h>. X servers
//! using the evdev driver report every key as its evdev code plus 8.

/// Offset between X11 keycodes and evdev keycodes
pub const X11_KEYCODE_OFFSET: u8 = 8;

// ============================================================================
// Editing Keys
// ============================================================================

pub const KEY_ESC: u32 = 1;
pub const KEY_BACKSPACE: u32 = 14;
pub const KEY_ENTER: u32 = 28;
pub const KEY_SPACE: u32 = 57;

/// Keypad Enter
pub const KEY_KPENTER: u32 = 96;

// ============================================================================
// Modifier Keys
// ============================================================================

/// Left Control key
pub const KEY_LEFTCTRL: u32 = 29;

/// Right Control key
pub const KEY_RIGHTCTRL: u32 = 97;

/// Left Shift key
pub const KEY_LEFTSHIFT: u32 = 42;

/// Right Shift key
pub const KEY_RIGHTSHIFT: u32 = 54;

/// Left Alt key
pub const KEY_LEFTALT: u32 = 56;

/// Right Alt key (AltGr on some keyboards)
pub const KEY_RIGHTALT: u32 = 100;

/// Left Super key
pub const KEY_LEFTMETA: u32 = 125;

/// Right Super key
pub const KEY_RIGHTMETA: u32 = 126;

pub const KEY_CAPSLOCK: u32 = 58;
pub const KEY_NUMLOCK: u32 = 69;

// ============================================================================
// Function Keys
// ============================================================================

pub const KEY_F1: u32 = 59;
pub const KEY_F2: u32 = 60;
pub const KEY_F3: u32 = 61;
pub const KEY_F4: u32 = 62;
pub const KEY_F5: u32 = 63;

// ============================================================================
// Helper Functions
// ============================================================================

/// evdev code for an X11 keycode (None for codes below the offset)
#[inline]
pub fn from_x11_keycode(detail: u8) -> Option<u32> {
    detail.checked_sub(X11_KEYCODE_OFFSET).map(u32::from)
}

/// Check if keycode is a modifier or lock key
#[inline]
pub const fn is_modifier_key(keycode: u32) -> bool {
    matches!(
        keycode,
        KEY_LEFTSHIFT
            | KEY_RIGHTSHIFT
            | KEY_LEFTCTRL
            | KEY_RIGHTCTRL
            | KEY_LEFTALT
            | KEY_RIGHTALT
            | KEY_LEFTMETA
            | KEY_RIGHTMETA
            | KEY_CAPSLOCK
            | KEY_NUMLOCK
    )
}

/// Check if keycode produces a character on a US layout
/// (main block letters, digits and punctuation, space, keypad digits)
#[inline]
pub const fn is_printable_key(keycode: u32) -> bool {
    matches!(keycode, 2..=13 | 16..=27 | 30..=41 | 43..=53 | 71..=83)
        || keycode == KEY_SPACE
        || keycode == 55 // KP *
        || keycode == 98 // KP /
}

/// Convert function key code to function key number (1-5)
/// Returns None if not one of those function keys
#[inline]
pub const fn function_key_number(keycode: u32) -> Option<u8> {
    match keycode {
        KEY_F1 => Some(1),
        KEY_F2 => Some(2),
        KEY_F3 => Some(3),
        KEY_F4 => Some(4),
        KEY_F5 => Some(5),
        _ => None,
    }
}
