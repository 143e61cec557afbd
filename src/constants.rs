//! Global constants for lockring
//!
//! Consolidates indicator geometry, timing, and color constants
//! to eliminate magic numbers throughout the codebase.

use std::f64::consts::PI;
use std::time::Duration;

use crate::utils::Rgba;

// ============================================================================
// Indicator Geometry (logical pixels, before display scaling)
// ============================================================================

/// Radius of the indicator ring (center of the stroke)
pub const BUTTON_RADIUS: f64 = 90.0;

/// Radius plus half the ring stroke
pub const BUTTON_SPACE: f64 = BUTTON_RADIUS + 5.0;

/// Center of the indicator glyph on both axes
pub const BUTTON_CENTER: f64 = BUTTON_RADIUS + 5.0;

/// Logical edge length of the square indicator glyph
pub const BUTTON_DIAMETER: f64 = 2.0 * BUTTON_SPACE;

/// Vertical gap between stacked text lines
pub const INFO_MARGIN: f64 = 12.0;

/// Ring stroke width
pub const RING_LINE_WIDTH: f64 = 10.0;

/// Inner separator ring radius
pub const SEPARATOR_RADIUS: f64 = BUTTON_RADIUS - 5.0;

/// Inner separator ring stroke width
pub const SEPARATOR_LINE_WIDTH: f64 = 2.0;

/// Angular span of the keypress highlight
pub const HIGHLIGHT_SPAN: f64 = PI / 3.0;

/// Angular span of the ticks delimiting the highlight
pub const HIGHLIGHT_TICK_SPAN: f64 = PI / 128.0;

// ============================================================================
// Side Panels (logical pixels)
// ============================================================================

/// Modifier panel size
pub const MODIFIER_PANEL_WIDTH: f64 = 300.0;
pub const MODIFIER_PANEL_HEIGHT: f64 = 50.0;

/// Logout banner size
pub const LOGOUT_BANNER_WIDTH: f64 = 450.0;
pub const LOGOUT_BANNER_HEIGHT: f64 = 80.0;

/// Physical-pixel gap between a side panel and its anchor
pub const PANEL_GAP: i32 = 50;

/// Default logout hint shown once the lock outlasts the authorized time
pub const DEFAULT_LOGOUT_HINT: &str = "Super + Shift + E to logout";

// ============================================================================
// Typography
// ============================================================================

/// Elapsed time font size
pub const TIME_FONT_SIZE: f64 = 32.0;

/// Status, login, caption, and modifier font size
pub const INFO_FONT_SIZE: f64 = 14.0;

/// Logout hint font size
pub const BANNER_FONT_SIZE: f64 = 32.0;

/// Caption drawn above the elapsed time
pub const LOCKED_FOR_CAPTION: &str = "Locked for";

// ============================================================================
// Timing
// ============================================================================

/// Delay between (re)arming the clock tick and its first fire
pub const TICK_FIRST_DELAY: Duration = Duration::from_secs(1);

/// Clock tick interval
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Idle time after a keystroke before the highlight is cleared
pub const CLEAR_INDICATOR_DELAY: Duration = Duration::from_secs(1);

/// Default minutes after which the logout hint takes over
pub const DEFAULT_AUTHORIZED_LOCK_MINUTES: u64 = 60;

// ============================================================================
// Display
// ============================================================================

/// Reference DPI for a scale factor of 1.0
pub const BASE_DPI: f64 = 96.0;

/// Minimum display scale factor
pub const MIN_DISPLAY_SCALE: f64 = 0.5;

/// Maximum display scale factor
pub const MAX_DISPLAY_SCALE: f64 = 4.0;

// ============================================================================
// Palette
// ============================================================================

/// Ring fill while verifying or locking
pub const FILL_BLUE: Rgba = Rgba::new(0.0, 114.0 / 255.0, 255.0 / 255.0, 0.75);

/// Ring fill for failures and the authorized override
pub const FILL_RED: Rgba = Rgba::new(250.0 / 255.0, 0.0, 0.0, 0.75);

/// Ring fill at rest
pub const FILL_NEUTRAL: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.75);

/// Ring stroke while verifying or locking
pub const STROKE_BLUE: Rgba = Rgba::new(51.0 / 255.0, 0.0, 250.0 / 255.0, 1.0);

/// Ring stroke for failures and the authorized override
pub const STROKE_RED: Rgba = Rgba::new(125.0 / 255.0, 51.0 / 255.0, 0.0, 1.0);

/// Ring stroke at rest
pub const STROKE_NEUTRAL: Rgba = Rgba::new(160.0 / 255.0, 160.0 / 255.0, 160.0 / 255.0, 1.0);

/// Modifier label text
pub const MODIFIER_TEXT: Rgba = Rgba::new(250.0 / 255.0, 0.0, 0.0, 1.0);
