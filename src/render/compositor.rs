//! Surface compositor
//!
//! Turns the session facts and screen geometry into one full-screen frame:
//! background first, then the indicator glyph once per output, then the
//! side panels. Every intermediate surface lives only for the call.

use std::f64::consts::TAU;

use anyhow::{Context, Result};
use image::RgbaImage;
use log::{debug, warn};
use rand::Rng;

use super::frame::{Frame, PanelKind, Placement};
use super::indicator::{paint_indicator, IndicatorParams};
use super::panels::{paint_logout_banner, paint_modifier_panel};
use super::placement::{indicator_positions, logout_banner_positions, modifier_panel_positions};
use crate::config::{BackgroundConfig, IndicatorConfig};
use crate::display::geometry::{Resolution, ScreenGeometry};
use crate::drawing::Canvas;
use crate::font::Typeface;
use crate::session::{AuthState, InputState, SessionFacts};
use crate::utils::Rgba;

/// Full-screen background source
pub struct Background {
    color: Rgba,
    image: Option<RgbaImage>,
    tile: bool,
}

impl Background {
    pub fn solid(color: Rgba) -> Self {
        Self {
            color,
            image: None,
            tile: false,
        }
    }

    pub fn with_image(color: Rgba, image: RgbaImage, tile: bool) -> Self {
        Self {
            color,
            image: Some(image),
            tile,
        }
    }

    /// Build from configuration. An image that fails to load is logged and
    /// the solid color is used instead.
    pub fn from_config(config: &BackgroundConfig) -> Self {
        let color = config.color_rgba();
        let Some(path) = config.image_path() else {
            return Self::solid(color);
        };
        match load_image(path) {
            Ok(image) => {
                debug!(
                    "Background image {}: {}x{}",
                    path.display(),
                    image.width(),
                    image.height()
                );
                Self::with_image(color, image, config.tile)
            }
            Err(e) => {
                warn!("{:#}, using solid background", e);
                Self::solid(color)
            }
        }
    }

    /// Paint the background at the full virtual-screen resolution
    pub fn paint(&self, res: Resolution) -> Canvas {
        let mut canvas = Canvas::new(res.width, res.height);
        canvas.fill(self.color);
        match &self.image {
            Some(img) if self.tile => canvas.tile_image(img),
            Some(img) => canvas.draw_image(img, 0, 0),
            None => {}
        }
        canvas
    }
}

fn load_image(path: &std::path::Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to load background image {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// Indicator settings the compositor reads on every call
#[derive(Debug, Clone)]
pub struct CompositorSettings {
    pub indicator_enabled: bool,
    pub show_failed_attempts: bool,
    pub logout_hint: String,
}

impl From<&IndicatorConfig> for CompositorSettings {
    fn from(config: &IndicatorConfig) -> Self {
        Self {
            indicator_enabled: config.enabled,
            show_failed_attempts: config.show_failed_attempts,
            logout_hint: config.logout_hint.clone(),
        }
    }
}

/// Builds frames from state
pub struct Compositor<R: Rng> {
    settings: CompositorSettings,
    background: Background,
    face: Box<dyn Typeface>,
    rng: R,
}

impl<R: Rng> Compositor<R> {
    pub fn new(
        settings: CompositorSettings,
        background: Background,
        face: Box<dyn Typeface>,
        rng: R,
    ) -> Self {
        Self {
            settings,
            background,
            face,
            rng,
        }
    }

    /// Composite one frame. Never fails: unknown geometry centers every
    /// surface on the virtual screen.
    pub fn composite(
        &mut self,
        facts: &SessionFacts,
        input: InputState,
        auth: AuthState,
        geometry: &ScreenGeometry,
    ) -> Frame {
        let res = geometry.resolution;
        let mut canvas = self.background.paint(res);
        if !self.settings.indicator_enabled {
            return Frame::background_only(canvas);
        }

        let scale = geometry.scale;
        let outputs = &geometry.outputs;
        let mut placements = Vec::new();

        let highlight_start = match input {
            InputState::KeyActive | InputState::BackspaceActive => {
                Some(self.rng.gen_range(0.0..TAU))
            }
            _ => None,
        };

        let glyph = paint_indicator(
            self.face.as_ref(),
            scale,
            &IndicatorParams {
                facts,
                input,
                auth,
                show_failed_attempts: self.settings.show_failed_attempts,
                highlight_start,
            },
        );
        debug!(
            "Compositing: scale={:.2}, diameter={}px, outputs={}",
            scale,
            glyph.width(),
            outputs.len()
        );
        for (x, y) in indicator_positions(outputs, res, glyph.width()) {
            place(&mut canvas, &glyph, PanelKind::Indicator, x, y, &mut placements);
        }

        if auth == AuthState::Wrong {
            if let Some(label) = &facts.modifier_label {
                let panel = paint_modifier_panel(self.face.as_ref(), scale, label);
                for (x, y) in modifier_panel_positions(outputs, res, panel.width(), panel.height())
                {
                    place(&mut canvas, &panel, PanelKind::ModifierPanel, x, y, &mut placements);
                }
            }
        }

        if facts.authorized_override {
            let banner = paint_logout_banner(self.face.as_ref(), scale, &self.settings.logout_hint);
            for (x, y) in logout_banner_positions(outputs, res, banner.width(), banner.height()) {
                place(&mut canvas, &banner, PanelKind::LogoutBanner, x, y, &mut placements);
            }
        }

        Frame::new(canvas, placements, highlight_start)
    }
}

fn place(
    canvas: &mut Canvas,
    surface: &Canvas,
    kind: PanelKind,
    x: i32,
    y: i32,
    placements: &mut Vec<Placement>,
) {
    canvas.composite(surface, x, y);
    placements.push(Placement {
        kind,
        x,
        y,
        width: surface.width(),
        height: surface.height(),
    });
}
