//! Where composited surfaces land on the virtual screen
//!
//! All arithmetic is on integer physical pixels with truncating division,
//! so odd sizes round the same way on every output. Each function yields
//! one position per output, or a single fallback position relative to the
//! whole virtual screen when the output list is empty.

use crate::constants::PANEL_GAP;
use crate::display::geometry::{Output, Resolution};

/// Position per output, or the fallback when there are no outputs
fn per_output(
    outputs: &[Output],
    fallback: impl FnOnce() -> (i32, i32),
    place: impl Fn(&Output) -> (i32, i32),
) -> Vec<(i32, i32)> {
    if outputs.is_empty() {
        vec![fallback()]
    } else {
        outputs.iter().map(place).collect()
    }
}

/// Indicator glyph of physical edge `d`: centered in each output
pub fn indicator_positions(outputs: &[Output], res: Resolution, d: u32) -> Vec<(i32, i32)> {
    let half = d as i32 / 2;
    per_output(
        outputs,
        || (res.width as i32 / 2 - half, res.height as i32 / 2 - half),
        |o| (o.x + (o.width as i32 / 2 - half), o.y + (o.height as i32 / 2 - half)),
    )
}

/// Modifier panel of physical size `w`×`h`: below the indicator
pub fn modifier_panel_positions(
    outputs: &[Output],
    res: Resolution,
    w: u32,
    h: u32,
) -> Vec<(i32, i32)> {
    let (w, h) = (w as i32, h as i32);
    per_output(
        outputs,
        || (res.width as i32 / 2 - w / 2, res.height as i32 / 2 + h + 2 * PANEL_GAP),
        |o| (o.x + o.width as i32 / 2 - w / 2, o.y + o.height as i32 / 2 + h + PANEL_GAP),
    )
}

/// Logout banner of physical size `w`×`h`: near the bottom edge
pub fn logout_banner_positions(
    outputs: &[Output],
    res: Resolution,
    w: u32,
    h: u32,
) -> Vec<(i32, i32)> {
    let (w, h) = (w as i32, h as i32);
    per_output(
        outputs,
        || (res.width as i32 / 2 - w / 2, res.height as i32 - h - PANEL_GAP),
        |o| (o.x + o.width as i32 / 2 - w / 2, o.y + o.height as i32 - h - PANEL_GAP),
    )
}
