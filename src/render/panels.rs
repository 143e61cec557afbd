//! Side panels: the modifier label shown after a rejected attempt and the
//! logout hint banner shown once the lock outlasts the authorized time

use crate::constants::{
    BANNER_FONT_SIZE, FILL_RED, INFO_FONT_SIZE, LOGOUT_BANNER_HEIGHT, LOGOUT_BANNER_WIDTH,
    MODIFIER_PANEL_HEIGHT, MODIFIER_PANEL_WIDTH, MODIFIER_TEXT,
};
use crate::drawing::Canvas;
use crate::font::Typeface;
use crate::utils::Rgba;

/// Physical size of a logical panel at `scale`
pub fn physical_size(scale: f64, width: f64, height: f64) -> (u32, u32) {
    ((scale * width).ceil() as u32, (scale * height).ceil() as u32)
}

/// Draw `text` centered in a `width`×`height` logical box. The pen
/// position is truncated to whole logical pixels.
fn draw_centered(
    face: &dyn Typeface,
    canvas: &mut Canvas,
    text: &str,
    width: f64,
    height: f64,
    size: f64,
    color: Rgba,
) {
    let ext = face.extents(text, size);
    let x = (width / 2.0 - (ext.width / 2.0 + ext.x_bearing)).trunc();
    let y = (height / 2.0 - (ext.height / 2.0 + ext.y_bearing)).trunc();
    face.draw(canvas, text, x, y, size, color);
}

/// Transparent panel with the red modifier label
pub fn paint_modifier_panel(face: &dyn Typeface, scale: f64, label: &str) -> Canvas {
    let (w, h) = physical_size(scale, MODIFIER_PANEL_WIDTH, MODIFIER_PANEL_HEIGHT);
    let mut canvas = Canvas::new(w, h).with_scale(scale);
    draw_centered(
        face,
        &mut canvas,
        label,
        MODIFIER_PANEL_WIDTH,
        MODIFIER_PANEL_HEIGHT,
        INFO_FONT_SIZE,
        MODIFIER_TEXT,
    );
    canvas
}

/// Translucent red banner with the white logout hint
pub fn paint_logout_banner(face: &dyn Typeface, scale: f64, hint: &str) -> Canvas {
    let (w, h) = physical_size(scale, LOGOUT_BANNER_WIDTH, LOGOUT_BANNER_HEIGHT);
    let mut canvas = Canvas::new(w, h).with_scale(scale);
    canvas.fill_rect(0.0, 0.0, LOGOUT_BANNER_WIDTH, LOGOUT_BANNER_HEIGHT, FILL_RED);
    draw_centered(
        face,
        &mut canvas,
        hint,
        LOGOUT_BANNER_WIDTH,
        LOGOUT_BANNER_HEIGHT,
        BANNER_FONT_SIZE,
        Rgba::WHITE,
    );
    canvas
}
