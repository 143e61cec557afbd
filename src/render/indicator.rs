//! Unlock indicator glyph
//!
//! Paints the square indicator image: colored disk and ring, the elapsed
//! time with its caption, the status and login lines, the inner separator,
//! and the keypress highlight. Layout is in logical units around
//! `BUTTON_CENTER`; the canvas scale maps it to physical pixels.

use log::debug;

use super::palette::{ring_colors, status_line};
use crate::constants::{
    BUTTON_CENTER, BUTTON_DIAMETER, BUTTON_RADIUS, HIGHLIGHT_SPAN, HIGHLIGHT_TICK_SPAN,
    INFO_FONT_SIZE, INFO_MARGIN, LOCKED_FOR_CAPTION, RING_LINE_WIDTH, SEPARATOR_LINE_WIDTH,
    SEPARATOR_RADIUS, TIME_FONT_SIZE,
};
use crate::drawing::Canvas;
use crate::font::{TextExtents, Typeface};
use crate::session::{AuthState, InputState, SessionFacts};
use crate::utils::Rgba;

/// Physical edge length of the indicator glyph at `scale`
pub fn physical_diameter(scale: f64) -> u32 {
    (scale * BUTTON_DIAMETER).ceil() as u32
}

/// Everything the glyph depends on for one redraw
pub struct IndicatorParams<'a> {
    pub facts: &'a SessionFacts,
    pub input: InputState,
    pub auth: AuthState,
    pub show_failed_attempts: bool,
    /// Start angle of the keypress highlight; drawn only while a key or
    /// backspace is active
    pub highlight_start: Option<f64>,
}

/// Horizontal pen position that centers `ext` on the glyph
fn centered_x(ext: &TextExtents) -> f64 {
    BUTTON_CENTER - (ext.width / 2.0 + ext.x_bearing)
}

/// Paint the glyph onto a fresh transparent canvas
pub fn paint_indicator(face: &dyn Typeface, scale: f64, params: &IndicatorParams<'_>) -> Canvas {
    let d = physical_diameter(scale);
    let mut canvas = Canvas::new(d, d).with_scale(scale);
    let c = BUTTON_CENTER;
    let facts = params.facts;

    let colors = ring_colors(facts.authorized_override, params.auth, params.input);
    canvas.fill_disc(c, c, BUTTON_RADIUS, colors.fill);
    canvas.stroke_circle(c, c, BUTTON_RADIUS, RING_LINE_WIDTH, colors.stroke);

    // Elapsed time, centered on both axes
    let time = facts.elapsed_label();
    let time_ext = face.extents(&time, TIME_FONT_SIZE);
    let time_x = centered_x(&time_ext);
    let time_y = c - (time_ext.height / 2.0 + time_ext.y_bearing);
    face.draw(&mut canvas, &time, time_x, time_y, TIME_FONT_SIZE, Rgba::WHITE);

    let status = status_line(facts, params.input, params.auth, params.show_failed_attempts);
    if let Some(text) = &status {
        let ext = face.extents(text, INFO_FONT_SIZE);
        let y = time_y - ext.y_bearing + INFO_MARGIN;
        face.draw(&mut canvas, text, centered_x(&ext), y, INFO_FONT_SIZE, Rgba::WHITE);
    }

    if let Some(login) = &facts.login {
        let ext = face.extents(login, INFO_FONT_SIZE);
        let y = if status.is_some() {
            time_y - time_ext.y_bearing + INFO_MARGIN * 2.0
        } else {
            time_y - ext.y_bearing + INFO_MARGIN
        };
        face.draw(&mut canvas, login, centered_x(&ext), y, INFO_FONT_SIZE, Rgba::WHITE);
    }

    let caption_ext = face.extents(LOCKED_FOR_CAPTION, INFO_FONT_SIZE);
    let caption_y = time_y + time_ext.y_bearing - INFO_MARGIN;
    face.draw(
        &mut canvas,
        LOCKED_FOR_CAPTION,
        centered_x(&caption_ext),
        caption_y,
        INFO_FONT_SIZE,
        Rgba::WHITE,
    );

    canvas.stroke_circle(c, c, SEPARATOR_RADIUS, SEPARATOR_LINE_WIDTH, Rgba::BLACK);

    let highlight_color = match params.input {
        InputState::KeyActive => Some(Rgba::WHITE),
        InputState::BackspaceActive => Some(Rgba::BLACK),
        _ => None,
    };
    if let (Some(color), Some(start)) = (highlight_color, params.highlight_start) {
        paint_highlight(&mut canvas, start, color);
    }

    debug!(
        "Indicator painted: {}px, input={:?}, auth={:?}, time={}",
        d, params.input, params.auth, time
    );
    canvas
}

/// One highlighted arc with black ticks at both ends
fn paint_highlight(canvas: &mut Canvas, start: f64, color: Rgba) {
    let c = BUTTON_CENTER;
    canvas.stroke_arc(c, c, BUTTON_RADIUS, RING_LINE_WIDTH, start, HIGHLIGHT_SPAN, color);
    canvas.stroke_arc(
        c,
        c,
        BUTTON_RADIUS,
        RING_LINE_WIDTH,
        start,
        HIGHLIGHT_TICK_SPAN,
        Rgba::BLACK,
    );
    canvas.stroke_arc(
        c,
        c,
        BUTTON_RADIUS,
        RING_LINE_WIDTH,
        start + HIGHLIGHT_SPAN - HIGHLIGHT_TICK_SPAN,
        HIGHLIGHT_TICK_SPAN,
        Rgba::BLACK,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STROKE_NEUTRAL;
    use crate::font::text::testing::BoxFace;

    fn facts(locked_secs: u64) -> SessionFacts {
        SessionFacts {
            locked_secs,
            ..SessionFacts::default()
        }
    }

    fn params(facts: &SessionFacts) -> IndicatorParams<'_> {
        IndicatorParams {
            facts,
            input: InputState::Idle,
            auth: AuthState::Idle,
            show_failed_attempts: false,
            highlight_start: None,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_physical_diameter() {
        assert_eq!(physical_diameter(1.0), 190);
        assert_eq!(physical_diameter(1.5), 285);
        assert_eq!(physical_diameter(1.25), 238);
    }

    #[test]
    fn test_time_is_centered() {
        let face = BoxFace::default();
        let f = facts(125);
        paint_indicator(&face, 1.0, &params(&f));

        let time = face.find("02:05").unwrap();
        let ext = face.extents("02:05", TIME_FONT_SIZE);
        assert!(close(time.x, 95.0 - (ext.width / 2.0 + ext.x_bearing)));
        assert!(close(time.y, 95.0 - (ext.height / 2.0 + ext.y_bearing)));
        assert_eq!(time.size, TIME_FONT_SIZE);
    }

    #[test]
    fn test_text_baselines() {
        let face = BoxFace::default();
        let mut f = facts(60);
        f.login = Some("alice".into());
        let mut p = params(&f);
        p.auth = AuthState::Verifying;
        paint_indicator(&face, 1.0, &p);

        let time_ext = face.extents("01:00", TIME_FONT_SIZE);
        let time_y = 95.0 - (time_ext.height / 2.0 + time_ext.y_bearing);

        let status = face.find("Verifying...").unwrap();
        let status_ext = face.extents("Verifying...", INFO_FONT_SIZE);
        assert!(close(status.y, time_y - status_ext.y_bearing + 12.0));

        // With a status line the login sits below it
        let login = face.find("alice").unwrap();
        assert!(close(login.y, time_y - time_ext.y_bearing + 24.0));

        let caption = face.find("Locked for").unwrap();
        assert!(close(caption.y, time_y + time_ext.y_bearing - 12.0));
    }

    #[test]
    fn test_login_without_status() {
        let face = BoxFace::default();
        let mut f = facts(0);
        f.login = Some("bob".into());
        paint_indicator(&face, 1.0, &params(&f));

        let time_ext = face.extents("00:00", TIME_FONT_SIZE);
        let time_y = 95.0 - (time_ext.height / 2.0 + time_ext.y_bearing);
        let login_ext = face.extents("bob", INFO_FONT_SIZE);
        let login = face.find("bob").unwrap();
        assert!(close(login.y, time_y - login_ext.y_bearing + 12.0));
        // Time, login, caption
        assert_eq!(face.drawn().len(), 3);
    }

    #[test]
    fn test_ring_stroke_color() {
        let face = BoxFace::default();
        let f = facts(0);
        let canvas = paint_indicator(&face, 1.0, &params(&f));
        // 89.5px right of center: inside the ring stroke, clear of the separator
        assert_eq!(canvas.pixel(184, 95), Some(STROKE_NEUTRAL.to_argb32_premultiplied()));
    }

    #[test]
    fn test_key_highlight_is_white() {
        let face = BoxFace::default();
        let f = facts(0);
        let mut p = params(&f);
        p.input = InputState::KeyActive;
        p.highlight_start = Some(0.0);
        let canvas = paint_indicator(&face, 1.0, &p);
        // Middle of the arc, at π/6
        assert_eq!(canvas.pixel(172, 140), Some(0xffff_ffff));
        // Opposite side keeps the ring color
        assert_eq!(canvas.pixel(5, 95), Some(STROKE_NEUTRAL.to_argb32_premultiplied()));
    }

    #[test]
    fn test_backspace_highlight_is_black() {
        let face = BoxFace::default();
        let f = facts(0);
        let mut p = params(&f);
        p.input = InputState::BackspaceActive;
        p.highlight_start = Some(0.0);
        let canvas = paint_indicator(&face, 1.0, &p);
        assert_eq!(canvas.pixel(172, 140), Some(0xff00_0000));
    }

    /// Pixel on the ring's center line at `angle`, for a scale-1 glyph
    fn ring_pixel(angle: f64) -> (u32, u32) {
        let x = BUTTON_CENTER + BUTTON_RADIUS * angle.cos();
        let y = BUTTON_CENTER + BUTTON_RADIUS * angle.sin();
        (x.floor() as u32, y.floor() as u32)
    }

    #[test]
    fn test_highlight_span_and_end_ticks() {
        use std::f64::consts::PI;

        let face = BoxFace::default();
        let f = facts(0);
        let mut p = params(&f);
        p.input = InputState::KeyActive;
        p.highlight_start = Some(1.0);
        let canvas = paint_indicator(&face, 1.0, &p);
        let at = |offset: f64| {
            let (x, y) = ring_pixel(1.0 + offset);
            canvas.pixel(x, y)
        };
        let neutral = Some(STROKE_NEUTRAL.to_argb32_premultiplied());

        // Black ticks just inside both ends
        assert_eq!(at(0.012), Some(0xff00_0000));
        assert_eq!(at(PI / 3.0 - 0.012), Some(0xff00_0000));
        // White between them
        assert_eq!(at(PI / 6.0), Some(0xffff_ffff));
        // Ring color just outside the span
        assert_eq!(at(-0.06), neutral);
        assert_eq!(at(PI / 3.0 + 0.06), neutral);
    }

    #[test]
    fn test_no_highlight_when_idle() {
        let face = BoxFace::default();
        let f = facts(0);
        let mut p = params(&f);
        p.highlight_start = Some(0.0);
        let canvas = paint_indicator(&face, 1.0, &p);
        assert_eq!(canvas.pixel(172, 140), Some(STROKE_NEUTRAL.to_argb32_premultiplied()));
    }
}
