//! Presentation swap
//!
//! Publishes a finished frame. The X11 presenter uploads the frame into a
//! new pixmap, installs it as the window background, clears the window so
//! the server repaints from it, and only then releases the pixmap that was
//! installed before. The frame is complete before any of this starts, so
//! the window never shows a partially composited image.

use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;
use x11rb::connection::{Connection, RequestConnection};
use x11rb::errors::{ConnectionError, ReplyOrIdError};
use x11rb::protocol::xproto::{
    ChangeWindowAttributesAux, ConnectionExt as _, CreateGCAux, Gcontext, ImageFormat, Pixmap,
};
use x11rb::rust_connection::RustConnection;

use super::x11::X11Display;
use crate::drawing::Canvas;
use crate::render::Frame;

/// Presentation failures
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("X11 connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("X11 resource allocation failed: {0}")]
    Allocation(#[from] ReplyOrIdError),
    #[error("frame of {0}x{1} exceeds X11 drawable limits")]
    TooLarge(u32, u32),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can show a frame
pub trait Presenter {
    fn present(&mut self, frame: &Frame) -> Result<(), PresentError>;
}

/// Pixmap that is freed when dropped
struct BackingPixmap<'a> {
    conn: &'a RustConnection,
    id: Pixmap,
}

impl Drop for BackingPixmap<'_> {
    fn drop(&mut self) {
        let _ = self.conn.free_pixmap(self.id);
    }
}

/// Window-background presenter
pub struct X11Presenter<'a> {
    display: &'a X11Display,
    gc: Gcontext,
    /// Currently installed background, owned until the next swap
    current: Option<BackingPixmap<'a>>,
}

impl<'a> X11Presenter<'a> {
    pub fn new(display: &'a X11Display) -> Result<Self, PresentError> {
        let conn = display.connection();
        let gc = conn.generate_id()?;
        conn.create_gc(gc, display.window(), &CreateGCAux::new())?;
        Ok(Self {
            display,
            gc,
            current: None,
        })
    }

    /// Upload a canvas into a fresh pixmap, in strips that fit the
    /// server's maximum request size
    fn upload(&self, canvas: &Canvas) -> Result<BackingPixmap<'a>, PresentError> {
        let conn = self.display.connection();
        let (w, h) = (canvas.width(), canvas.height());
        if w == 0 || h == 0 || w > u16::MAX as u32 || h > i16::MAX as u32 {
            return Err(PresentError::TooLarge(w, h));
        }

        let id = conn.generate_id()?;
        conn.create_pixmap(self.display.depth(), id, self.display.window(), w as u16, h as u16)?;
        let pixmap = BackingPixmap { conn, id };

        let data = canvas.to_bgrx();
        let row_bytes = w as usize * 4;
        // Leave room for the PutImage request header
        let budget = conn.maximum_request_bytes().saturating_sub(64);
        let rows_per_strip = (budget / row_bytes).clamp(1, h as usize);

        let mut y = 0usize;
        for strip in data.chunks(row_bytes * rows_per_strip) {
            let rows = strip.len() / row_bytes;
            conn.put_image(
                ImageFormat::Z_PIXMAP,
                id,
                self.gc,
                w as u16,
                rows as u16,
                0,
                y as i16,
                0,
                self.display.depth(),
                strip,
            )?;
            y += rows;
        }
        Ok(pixmap)
    }
}

impl Presenter for X11Presenter<'_> {
    fn present(&mut self, frame: &Frame) -> Result<(), PresentError> {
        let conn = self.display.connection();
        let canvas = frame.canvas();
        let pixmap = self.upload(canvas)?;

        conn.change_window_attributes(
            self.display.window(),
            &ChangeWindowAttributesAux::new().background_pixmap(pixmap.id),
        )?;
        // Repaint the whole window from the new background
        conn.clear_area(
            false,
            self.display.window(),
            0,
            0,
            canvas.width() as u16,
            canvas.height() as u16,
        )?;

        // Release the previous background only after the swap
        self.current = Some(pixmap);
        conn.flush()?;
        debug!("Presented {}x{} frame", canvas.width(), canvas.height());
        Ok(())
    }
}

impl Drop for X11Presenter<'_> {
    fn drop(&mut self) {
        let conn = self.display.connection();
        self.current = None;
        let _ = conn.free_gc(self.gc);
        let _ = conn.flush();
    }
}

/// Writes each presented frame to a PNG file
pub struct PngPresenter {
    path: PathBuf,
}

impl PngPresenter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default snapshot path: `lockring_YYYYmmdd_HHMMSS.png` in `dir`
    pub fn timestamped(dir: &Path) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Self::new(dir.join(format!("lockring_{}.png", timestamp)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Presenter for PngPresenter {
    fn present(&mut self, frame: &Frame) -> Result<(), PresentError> {
        let canvas = frame.canvas();
        let file = std::fs::File::create(&self.path)?;
        let mut encoder =
            png::Encoder::new(std::io::BufWriter::new(file), canvas.width(), canvas.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&canvas.to_rgba8())?;
        info!("Frame saved: {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Keeps presented frames in memory
    #[derive(Default)]
    pub struct RecordingPresenter {
        pub frames: Vec<Frame>,
    }

    impl Presenter for RecordingPresenter {
        fn present(&mut self, frame: &Frame) -> Result<(), PresentError> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_presenter_writes_file() {
        let dir = std::env::temp_dir().join(format!("lockring-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("frame.png");

        let frame = Frame::background_only(Canvas::new(8, 4));
        let mut presenter = PngPresenter::new(&path);
        presenter.present(&frame).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
