//! Software drawing surface
//!
//! A premultiplied ARGB32 pixel buffer with the handful of operations the
//! indicator needs: solid fills, anti-aliased discs/rings/arcs, alpha-mask
//! blits for glyphs, image painting and tiling, and source-over compositing
//! of one canvas onto another.
//!
//! Shape operations take logical coordinates which are multiplied by the
//! canvas scale; blits and compositing take physical pixel offsets.

use image::RgbaImage;

use super::geometry::{disc_coverage, ring_coverage, wedge_coverage};
use crate::utils::Rgba;

/// Coverage below this is not worth blending
const COVERAGE_EPSILON: f32 = 1.0 / 512.0;

/// Off-screen drawing surface
#[derive(Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    /// Logical-to-physical scale for shape operations
    scale: f64,
    /// Premultiplied 0xAARRGGBB, row-major
    pixels: Vec<u32>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scale", &self.scale)
            .finish()
    }
}

impl Canvas {
    /// Create a fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Set the logical-to-physical scale used by shape operations
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Raw premultiplied ARGB32 pixels
    #[cfg(test)]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at physical coordinates (None if out of bounds)
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Replace every pixel with `color`
    pub fn fill(&mut self, color: Rgba) {
        let packed = color.to_argb32_premultiplied();
        self.pixels.fill(packed);
    }

    /// Source-over fill of a logical rectangle
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let s = self.scale;
        let (x0, y0, x1, y1) = (x * s, y * s, (x + w) * s, (y + h) * s);
        let Some((bx0, by0, bx1, by1)) = self.clip_bounds(x0, y0, x1, y1) else {
            return;
        };
        for py in by0..by1 {
            let cov_y = span_overlap(py as f64, y0, y1);
            for px in bx0..bx1 {
                let cov = cov_y * span_overlap(px as f64, x0, x1);
                self.blend(px, py, color, cov as f32);
            }
        }
    }

    /// Source-over fill of a logical disc
    pub fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        let s = self.scale;
        let (cx, cy, r) = (cx * s, cy * s, radius * s);
        let Some((bx0, by0, bx1, by1)) =
            self.clip_bounds(cx - r - 1.0, cy - r - 1.0, cx + r + 1.0, cy + r + 1.0)
        else {
            return;
        };
        for py in by0..by1 {
            let dy = py as f64 + 0.5 - cy;
            for px in bx0..bx1 {
                let dx = px as f64 + 0.5 - cx;
                let cov = disc_coverage((dx * dx + dy * dy).sqrt(), r);
                self.blend(px, py, color, cov);
            }
        }
    }

    /// Stroke a full logical circle
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, color: Rgba) {
        self.stroke_arc(cx, cy, radius, line_width, 0.0, std::f64::consts::TAU, color);
    }

    /// Stroke a logical arc with butt caps.
    ///
    /// `start` is measured from +x toward +y; the arc covers
    /// `[start, start + span]`.
    pub fn stroke_arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        line_width: f64,
        start: f64,
        span: f64,
        color: Rgba,
    ) {
        let s = self.scale;
        let (cx, cy, r, lw) = (cx * s, cy * s, radius * s, line_width * s);
        let reach = r + lw / 2.0 + 1.0;
        let Some((bx0, by0, bx1, by1)) =
            self.clip_bounds(cx - reach, cy - reach, cx + reach, cy + reach)
        else {
            return;
        };
        for py in by0..by1 {
            let dy = py as f64 + 0.5 - cy;
            for px in bx0..bx1 {
                let dx = px as f64 + 0.5 - cx;
                let dist = (dx * dx + dy * dy).sqrt();
                let radial = ring_coverage(dist, r, lw);
                if radial <= COVERAGE_EPSILON {
                    continue;
                }
                let angular = wedge_coverage(dy.atan2(dx), dist, start, span);
                self.blend(px, py, color, radial * angular);
            }
        }
    }

    /// Blend an 8-bit alpha mask tinted with `color` at a physical offset
    pub fn blend_mask(&mut self, x: i32, y: i32, w: usize, h: usize, mask: &[u8], color: Rgba) {
        for my in 0..h {
            let py = y + my as i32;
            if py < 0 || py >= self.height as i32 {
                continue;
            }
            for mx in 0..w {
                let px = x + mx as i32;
                if px < 0 || px >= self.width as i32 {
                    continue;
                }
                let Some(&a) = mask.get(my * w + mx) else {
                    continue;
                };
                if a == 0 {
                    continue;
                }
                self.blend(px as u32, py as u32, color, a as f32 / 255.0);
            }
        }
    }

    /// Source-over composite `src` with its top-left at a physical offset.
    /// Parts falling outside this canvas are clipped.
    pub fn composite(&mut self, src: &Canvas, x: i32, y: i32) {
        for sy in 0..src.height {
            let dy = y + sy as i32;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + sx as i32;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let s = src.pixels[(sy * src.width + sx) as usize];
                let idx = (dy as u32 * self.width + dx as u32) as usize;
                self.pixels[idx] = over(s, self.pixels[idx]);
            }
        }
    }

    /// Paint an image once with its top-left at a physical offset
    pub fn draw_image(&mut self, img: &RgbaImage, x: i32, y: i32) {
        for (ix, iy, p) in img.enumerate_pixels() {
            let dx = x + ix as i32;
            let dy = y + iy as i32;
            if dx < 0 || dy < 0 || dx >= self.width as i32 || dy >= self.height as i32 {
                continue;
            }
            let idx = (dy as u32 * self.width + dx as u32) as usize;
            self.pixels[idx] = over(premultiply(p.0), self.pixels[idx]);
        }
    }

    /// Repeat an image across the whole canvas starting at the origin
    pub fn tile_image(&mut self, img: &RgbaImage) {
        let (iw, ih) = img.dimensions();
        if iw == 0 || ih == 0 {
            return;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                let p = img.get_pixel(x % iw, y % ih);
                let idx = (y * self.width + x) as usize;
                self.pixels[idx] = over(premultiply(p.0), self.pixels[idx]);
            }
        }
    }

    /// Straight-alpha RGBA bytes (for PNG output)
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            let a = (p >> 24) & 0xff;
            let un = |c: u32| {
                if a == 0 {
                    0
                } else {
                    ((c * 255 + a / 2) / a).min(255) as u8
                }
            };
            out.extend_from_slice(&[un((p >> 16) & 0xff), un((p >> 8) & 0xff), un(p & 0xff), a as u8]);
        }
        out
    }

    /// Little-endian BGRX bytes (X11 ZPixmap, 32 bpp); the pad byte is
    /// 0xff so the data is also valid for depth-32 visuals
    pub fn to_bgrx(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            out.extend_from_slice(&(p | 0xff00_0000).to_le_bytes());
        }
        out
    }

    /// Physical pixel bounds intersecting a float rectangle, clipped to the canvas
    fn clip_bounds(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<(u32, u32, u32, u32)> {
        let bx0 = x0.floor().max(0.0) as u32;
        let by0 = y0.floor().max(0.0) as u32;
        let bx1 = (x1.ceil().max(0.0) as u32).min(self.width);
        let by1 = (y1.ceil().max(0.0) as u32).min(self.height);
        if bx0 >= bx1 || by0 >= by1 {
            return None;
        }
        Some((bx0, by0, bx1, by1))
    }

    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        if coverage <= COVERAGE_EPSILON {
            return;
        }
        let idx = (y * self.width + x) as usize;
        let src = color.with_coverage(coverage).to_argb32_premultiplied();
        self.pixels[idx] = over(src, self.pixels[idx]);
    }
}

/// Portion of the unit pixel `[p, p + 1)` inside `[a, b)`
#[inline]
fn span_overlap(p: f64, a: f64, b: f64) -> f64 {
    ((p + 1.0).min(b) - p.max(a)).clamp(0.0, 1.0)
}

/// Premultiply straight RGBA bytes into ARGB32
#[inline]
fn premultiply([r, g, b, a]: [u8; 4]) -> u32 {
    let a32 = a as u32;
    let m = |c: u8| (c as u32 * a32 + 127) / 255;
    (a32 << 24) | (m(r) << 16) | (m(g) << 8) | m(b)
}

/// Porter-Duff source-over on premultiplied ARGB32
#[inline]
fn over(src: u32, dst: u32) -> u32 {
    let sa = src >> 24;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let channel = |shift: u32| {
        let s = (src >> shift) & 0xff;
        let d = (dst >> shift) & 0xff;
        (s + (d * inv + 127) / 255).min(255)
    };
    (channel(24) << 24) | (channel(16) << 16) | (channel(8) << 8) | channel(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha(p: u32) -> u32 {
        p >> 24
    }

    #[test]
    fn test_fill_rect_respects_scale() {
        let mut c = Canvas::new(20, 20).with_scale(2.0);
        c.fill_rect(0.0, 0.0, 5.0, 5.0, Rgba::WHITE);
        assert_eq!(c.pixel(9, 9), Some(0xffff_ffff));
        assert_eq!(c.pixel(10, 10), Some(0));
    }

    #[test]
    fn test_fill_disc_center_and_corner() {
        let mut c = Canvas::new(21, 21);
        c.fill_disc(10.5, 10.5, 8.0, Rgba::BLACK);
        assert_eq!(c.pixel(10, 10).map(alpha), Some(255));
        assert_eq!(c.pixel(0, 0), Some(0));
    }

    #[test]
    fn test_stroke_circle_leaves_hole() {
        let mut c = Canvas::new(200, 200);
        c.stroke_circle(100.0, 100.0, 90.0, 10.0, Rgba::WHITE);
        // Center is untouched, a point on the ring is opaque
        assert_eq!(c.pixel(100, 100), Some(0));
        assert_eq!(c.pixel(190, 100).map(alpha), Some(255));
    }

    #[test]
    fn test_stroke_arc_only_covers_its_wedge() {
        let mut c = Canvas::new(200, 200);
        // Quarter arc from +x toward +y (lower right on screen)
        c.stroke_arc(100.0, 100.0, 90.0, 10.0, 0.0, std::f64::consts::FRAC_PI_2, Rgba::WHITE);
        // 45° point lies in the lower right quadrant
        assert_eq!(c.pixel(163, 163).map(alpha), Some(255));
        // Upper left point is untouched
        assert_eq!(c.pixel(36, 36), Some(0));
    }

    #[test]
    fn test_composite_clips_and_blends() {
        let mut dst = Canvas::new(4, 4);
        dst.fill(Rgba::BLACK);
        let mut src = Canvas::new(2, 2);
        src.fill(Rgba::new(1.0, 1.0, 1.0, 0.5));
        dst.composite(&src, 3, 3);
        let p = dst.pixel(3, 3).unwrap_or(0);
        assert_eq!(alpha(p), 255);
        assert_eq!((p >> 16) & 0xff, 128);
        // Nothing outside the overlap changed
        assert_eq!(dst.pixel(2, 2), Some(0xff00_0000));
    }

    #[test]
    fn test_tile_image_repeats() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 255]));
        let mut c = Canvas::new(5, 2);
        c.tile_image(&img);
        assert_eq!(c.pixel(4, 1), Some(0xffff_0000));
        assert_eq!(c.pixel(3, 0), Some(0xff00_00ff));
    }

    #[test]
    fn test_bgrx_layout() {
        let mut c = Canvas::new(1, 1);
        c.fill(Rgba::from_u8(0x11, 0x22, 0x33, 1.0));
        assert_eq!(c.to_bgrx(), vec![0x33, 0x22, 0x11, 0xff]);
        assert_eq!(c.to_rgba8(), vec![0x11, 0x22, 0x33, 0xff]);
    }
}
