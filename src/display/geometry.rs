//! Screen geometry
//!
//! Output rectangles within the virtual screen, the virtual-screen
//! resolution, and the DPI-derived scale factor. An empty output list is a
//! valid state meaning the layout is unknown.

use anyhow::{anyhow, Context, Result};

use crate::constants::{BASE_DPI, MAX_DISPLAY_SCALE, MIN_DISPLAY_SCALE};

/// One physical display area within the virtual screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Virtual-screen size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Everything the compositor needs to know about the screen
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenGeometry {
    /// Ordered output list (may be empty)
    pub outputs: Vec<Output>,
    pub resolution: Resolution,
    /// Physical-to-logical pixel ratio
    pub scale: f64,
}

/// Source of the current screen geometry
pub trait GeometryProvider {
    fn geometry(&self) -> ScreenGeometry;
}

impl<G: GeometryProvider + ?Sized> GeometryProvider for &G {
    fn geometry(&self) -> ScreenGeometry {
        (**self).geometry()
    }
}

/// Fixed geometry (render mode and tests)
#[derive(Debug, Clone)]
pub struct StaticGeometry(pub ScreenGeometry);

impl GeometryProvider for StaticGeometry {
    fn geometry(&self) -> ScreenGeometry {
        self.0.clone()
    }
}

impl Output {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Parse an X geometry string: `WxH+X+Y` (offsets optional, may be negative)
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let offset_at = text.find(['+', '-']);
        let (size, offsets) = match offset_at {
            Some(i) => text.split_at(i),
            None => (text, ""),
        };
        let res = Resolution::parse(size)?;

        let (x, y) = if offsets.is_empty() {
            (0, 0)
        } else {
            let second = offsets[1..]
                .find(['+', '-'])
                .map(|i| i + 1)
                .ok_or_else(|| anyhow!("Missing y offset in \"{}\"", text))?;
            let (xs, ys) = offsets.split_at(second);
            let parse_off = |s: &str| {
                s.trim_start_matches('+')
                    .parse::<i32>()
                    .with_context(|| format!("Invalid offset in \"{}\"", text))
            };
            (parse_off(xs)?, parse_off(ys)?)
        };
        // Placement works in i32 screen coordinates
        if x as i64 + res.width as i64 > i32::MAX as i64
            || y as i64 + res.height as i64 > i32::MAX as i64
        {
            return Err(anyhow!("Output \"{}\" extends past the coordinate range", text));
        }
        Ok(Self::new(x, y, res.width, res.height))
    }
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse `WxH`
    pub fn parse(text: &str) -> Result<Self> {
        let (w, h) = text
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow!("Expected WIDTHxHEIGHT, got \"{}\"", text))?;
        let width = w.parse().with_context(|| format!("Invalid width in \"{}\"", text))?;
        let height = h.parse().with_context(|| format!("Invalid height in \"{}\"", text))?;
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(anyhow!("Size \"{}\" is too large", text));
        }
        Ok(Self { width, height })
    }
}

impl ScreenGeometry {
    /// Parse a comma-separated list of output geometries
    pub fn parse_outputs(text: &str) -> Result<Vec<Output>> {
        text.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Output::parse)
            .collect()
    }

    /// Smallest resolution that contains every output
    pub fn bounding_resolution(outputs: &[Output]) -> Option<Resolution> {
        let w = outputs
            .iter()
            .map(|o| (o.x.max(0) as u32).saturating_add(o.width))
            .max()?;
        let h = outputs
            .iter()
            .map(|o| (o.y.max(0) as u32).saturating_add(o.height))
            .max()?;
        Some(Resolution::new(w, h))
    }
}

/// Scale factor for a DPI value, clamped to a sane range
pub fn scale_for_dpi(dpi: f64) -> f64 {
    if dpi <= 0.0 || !dpi.is_finite() {
        return 1.0;
    }
    (dpi / BASE_DPI).clamp(MIN_DISPLAY_SCALE, MAX_DISPLAY_SCALE)
}
