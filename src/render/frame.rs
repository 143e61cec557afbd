//! Composited frame

use crate::drawing::Canvas;

/// What was composited at a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Indicator,
    ModifierPanel,
    LogoutBanner,
}

/// One surface composited onto the background, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub kind: PanelKind,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A finished full-screen image plus the record of what went where.
///
/// Built by the compositor, handed to a presenter, then dropped.
#[derive(Debug, Clone)]
pub struct Frame {
    canvas: Canvas,
    placements: Vec<Placement>,
    /// Start angle of the keypress highlight, if one was drawn
    highlight_start: Option<f64>,
}

impl Frame {
    pub(crate) fn new(
        canvas: Canvas,
        placements: Vec<Placement>,
        highlight_start: Option<f64>,
    ) -> Self {
        Self {
            canvas,
            placements,
            highlight_start,
        }
    }

    /// A frame with nothing composited on top of the background
    pub fn background_only(canvas: Canvas) -> Self {
        Self::new(canvas, Vec::new(), None)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Placements of one kind, in composition order
    #[cfg(test)]
    pub fn placements_of(&self, kind: PanelKind) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.kind == kind)
    }

    pub fn highlight_start(&self) -> Option<f64> {
        self.highlight_start
    }
}
