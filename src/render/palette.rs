//! Ring colors and status text
//!
//! Colors are chosen by walking an ordered rule table: the first rule that
//! matches wins. The authorized override sits above every auth state, and
//! every auth state sits above the input state.

use crate::constants::{
    FILL_BLUE, FILL_NEUTRAL, FILL_RED, STROKE_BLUE, STROKE_NEUTRAL, STROKE_RED,
};
use crate::session::{AuthState, InputState, SessionFacts};
use crate::utils::Rgba;

/// Fill and stroke of the indicator disk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingColors {
    pub fill: Rgba,
    pub stroke: Rgba,
}

impl RingColors {
    pub const BLUE: RingColors = RingColors {
        fill: FILL_BLUE,
        stroke: STROKE_BLUE,
    };
    pub const RED: RingColors = RingColors {
        fill: FILL_RED,
        stroke: STROKE_RED,
    };
    pub const NEUTRAL: RingColors = RingColors {
        fill: FILL_NEUTRAL,
        stroke: STROKE_NEUTRAL,
    };
}

/// Inputs a color rule looks at
#[derive(Debug, Clone, Copy)]
struct RuleInput {
    authorized_override: bool,
    auth: AuthState,
    input: InputState,
}

struct ColorRule {
    matches: fn(&RuleInput) -> bool,
    colors: RingColors,
}

/// Highest precedence first
const COLOR_RULES: &[ColorRule] = &[
    ColorRule {
        matches: |r| r.authorized_override,
        colors: RingColors::RED,
    },
    ColorRule {
        matches: |r| matches!(r.auth, AuthState::Verifying | AuthState::Locking),
        colors: RingColors::BLUE,
    },
    ColorRule {
        matches: |r| matches!(r.auth, AuthState::Wrong | AuthState::LockFailed),
        colors: RingColors::RED,
    },
    ColorRule {
        matches: |r| r.input == InputState::NothingToDelete,
        colors: RingColors::RED,
    },
];

/// Ring colors for the given state
pub fn ring_colors(authorized_override: bool, auth: AuthState, input: InputState) -> RingColors {
    let probe = RuleInput {
        authorized_override,
        auth,
        input,
    };
    COLOR_RULES
        .iter()
        .find(|rule| (rule.matches)(&probe))
        .map(|rule| rule.colors)
        .unwrap_or(RingColors::NEUTRAL)
}

/// Text shown under the elapsed time, if any
pub fn status_line(
    facts: &SessionFacts,
    input: InputState,
    auth: AuthState,
    show_failed_attempts: bool,
) -> Option<String> {
    let text = match auth {
        AuthState::Verifying => "Verifying...",
        AuthState::Locking => "Locking...",
        AuthState::Wrong => "Wrong!",
        AuthState::LockFailed => "Lock failed!",
        AuthState::Idle => {
            if input == InputState::NothingToDelete {
                "No input"
            } else if show_failed_attempts && facts.failed_attempts > 0 {
                return Some(failed_attempts_text(facts.failed_attempts));
            } else {
                return None;
            }
        }
    };
    Some(text.to_string())
}

fn failed_attempts_text(count: u32) -> String {
    if count == 1 {
        "1 failed attempt".to_string()
    } else {
        format!("{} failed attempts", count)
    }
}
