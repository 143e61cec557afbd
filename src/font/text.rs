//! Text measurement and drawing
//!
//! Indicator layout centers strings by their measured ink box rather than
//! by advance width, so the measurement API mirrors the usual vector
//! graphics text extents: bearings plus ink width/height, in logical units
//! with y growing downward.

use anyhow::{anyhow, Result};
use fontdue::{Font, FontSettings};
use log::info;

use crate::drawing::Canvas;
use crate::utils::Rgba;

/// Ink box of a string relative to its pen origin on the baseline
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtents {
    /// Distance from the origin to the leftmost ink
    pub x_bearing: f64,
    /// Distance from the baseline to the topmost ink (negative above the baseline)
    pub y_bearing: f64,
    /// Ink width
    pub width: f64,
    /// Ink height
    pub height: f64,
}

/// A face that can measure and paint single-line strings
pub trait Typeface {
    /// Measure `text` at `size` logical pixels
    fn extents(&self, text: &str, size: f64) -> TextExtents;

    /// Paint `text` with its pen origin at logical `(x, y)` on the baseline
    fn draw(&self, canvas: &mut Canvas, text: &str, x: f64, y: f64, size: f64, color: Rgba);
}

/// fontdue-backed typeface
pub struct FontdueFace {
    font: Font,
}

impl FontdueFace {
    /// Parse a TTF/OTF font from memory
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| anyhow!("Failed to parse font: {}", e))?;
        if let Some(name) = font.name() {
            info!("Indicator font: {}", name);
        }
        Ok(Self { font })
    }

    /// Kerning between two characters at `px`
    fn kern(&self, prev: Option<char>, ch: char, px: f32) -> f32 {
        prev.and_then(|p| self.font.horizontal_kern(p, ch, px))
            .unwrap_or(0.0)
    }
}

impl Typeface for FontdueFace {
    fn extents(&self, text: &str, size: f64) -> TextExtents {
        let px = size as f32;
        let mut pen = 0.0f32;
        let mut prev = None;
        let mut ink: Option<(f32, f32, f32, f32)> = None;

        for ch in text.chars() {
            pen += self.kern(prev, ch, px);
            let m = self.font.metrics(ch, px);
            if m.width > 0 && m.height > 0 {
                let left = pen + m.xmin as f32;
                let right = left + m.width as f32;
                let top = -(m.ymin as f32 + m.height as f32);
                let bottom = -(m.ymin as f32);
                ink = Some(match ink {
                    None => (left, top, right, bottom),
                    Some((l, t, r, b)) => (l.min(left), t.min(top), r.max(right), b.max(bottom)),
                });
            }
            pen += m.advance_width;
            prev = Some(ch);
        }

        match ink {
            Some((l, t, r, b)) => TextExtents {
                x_bearing: l as f64,
                y_bearing: t as f64,
                width: (r - l) as f64,
                height: (b - t) as f64,
            },
            None => TextExtents::default(),
        }
    }

    fn draw(&self, canvas: &mut Canvas, text: &str, x: f64, y: f64, size: f64, color: Rgba) {
        let scale = canvas.scale();
        let px = (size * scale) as f32;
        let baseline = (y * scale) as f32;
        let mut pen = (x * scale) as f32;
        let mut prev = None;

        for ch in text.chars() {
            pen += self.kern(prev, ch, px);
            let (m, bitmap) = self.font.rasterize(ch, px);
            if m.width > 0 && m.height > 0 {
                let gx = (pen + m.xmin as f32).round() as i32;
                let gy = (baseline - m.ymin as f32 - m.height as f32).round() as i32;
                canvas.blend_mask(gx, gy, m.width, m.height, &bitmap, color);
            }
            pen += m.advance_width;
            prev = Some(ch);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::fontconfig::load_system_font_fc;

    fn system_face() -> Option<FontdueFace> {
        let data = load_system_font_fc().ok()?;
        FontdueFace::from_bytes(data).ok()
    }

    #[test]
    fn test_fontdue_extents_match_ink() {
        let Some(face) = system_face() else {
            eprintln!("No system font available, skipping");
            return;
        };

        let ac = face.extents("ac", 32.0);
        let gy = face.extents("gy", 32.0);

        // Ink sits above the baseline
        assert!(ac.y_bearing < 0.0);
        assert!(ac.width > 0.0 && ac.height > 0.0);

        // Ink fits within the pen advance
        let advance: f32 = "ac".chars().map(|ch| face.font.metrics(ch, 32.0).advance_width).sum();
        let kern = face.kern(Some('a'), 'c', 32.0);
        assert!(ac.x_bearing + ac.width <= (advance + kern) as f64 + 1.0);

        // Descenders make the ink box taller
        assert!(gy.height > ac.height);
        assert!(gy.y_bearing + gy.height > ac.y_bearing + ac.height);
    }

    #[test]
    fn test_fontdue_extents_of_blank_text() {
        let Some(face) = system_face() else {
            return;
        };
        assert_eq!(face.extents("", 14.0), TextExtents::default());
        assert_eq!(face.extents(" ", 14.0).width, 0.0);
    }
}
