//! Color parsing utilities
//!
//! Hex color parsing for configuration values and the straight-alpha
//! color type used by the drawing layer.

/// Straight (non-premultiplied) RGBA color, components in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels and a float alpha
    pub fn from_u8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Same color with alpha multiplied by `coverage`
    #[inline]
    pub fn with_coverage(self, coverage: f32) -> Self {
        Self {
            a: self.a * coverage.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Pack into premultiplied ARGB32 (0xAARRGGBB)
    pub fn to_argb32_premultiplied(self) -> u32 {
        let a = self.a.clamp(0.0, 1.0);
        let ch = |c: f32| (c.clamp(0.0, 1.0) * a * 255.0).round() as u32;
        let a8 = (a * 255.0).round() as u32;
        (a8 << 24) | (ch(self.r) << 16) | (ch(self.g) << 8) | ch(self.b)
    }
}

/// Parse 6-digit hex color (e.g., "ff0000" -> (255, 0, 0))
/// Also supports 3-digit short format (e.g., "f00" -> (255, 0, 0))
/// Returns None on invalid input.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            // Short format: expand F -> FF
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// Parse hex color string (RRGGBB) to an opaque Rgba.
/// Returns white on invalid input.
pub fn parse_hex_color_to_rgba(hex: &str) -> Rgba {
    match parse_hex_color(hex) {
        Some((r, g, b)) => Rgba::from_u8(r, g, b, 1.0),
        None => Rgba::WHITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("ff0000"), Some((255, 0, 0)));
        assert_eq!(parse_hex_color("00ff00"), Some((0, 255, 0)));
        assert_eq!(parse_hex_color("0000ff"), Some((0, 0, 255)));
        assert_eq!(parse_hex_color("#ff0000"), Some((255, 0, 0)));
        assert_eq!(parse_hex_color("f00"), Some((255, 0, 0)));
        assert_eq!(parse_hex_color("invalid"), None);
        assert_eq!(parse_hex_color("ffé0"), None);
    }

    #[test]
    fn test_invalid_falls_back_to_white() {
        assert_eq!(parse_hex_color_to_rgba("zzzzzz"), Rgba::WHITE);
    }

    #[test]
    fn test_premultiplied_packing() {
        assert_eq!(Rgba::WHITE.to_argb32_premultiplied(), 0xffff_ffff);
        assert_eq!(Rgba::new(0.0, 0.0, 0.0, 0.0).to_argb32_premultiplied(), 0);
        let half_red = Rgba::new(1.0, 0.0, 0.0, 0.5).to_argb32_premultiplied();
        assert_eq!(half_red >> 24, 128);
        assert_eq!((half_red >> 16) & 0xff, 128);
    }
}
