//! X11 connection management
//!
//! Opens the display, creates the indicator window, and answers the
//! geometry questions the compositor asks: RandR monitor layout, root
//! window size, and DPI (Xft.dpi resource, else the physical screen size).

use std::cell::Cell;
use std::os::fd::{AsFd, BorrowedFd};

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::randr::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    AtomEnum, ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt as _,
    CreateWindowAux, EventMask, PropMode, Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::geometry::{scale_for_dpi, GeometryProvider, Output, Resolution, ScreenGeometry};
use crate::constants::BASE_DPI;

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
        _NET_WM_NAME,
        UTF8_STRING,
    }
}

/// Window title
const WINDOW_TITLE: &str = "lockring";

/// X11 display with the indicator window
pub struct X11Display {
    conn: RustConnection,
    root: Window,
    window: Window,
    depth: u8,
    atoms: Atoms,
    /// Physical screen size in millimeters (for DPI fallback)
    height_px: u16,
    height_mm: u16,
    /// Current root window size (follows RandR resizes)
    resolution: Cell<Resolution>,
    /// Configured DPI (0 = detect)
    dpi_override: f64,
}

impl X11Display {
    /// Connect to $DISPLAY and map a window covering the root window
    pub fn connect(dpi_override: f64) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| anyhow!("X screen {} not found", screen_num))?
            .clone();

        let depth = screen.root_depth;
        if depth != 24 && depth != 32 {
            return Err(anyhow!("Unsupported root depth {} (need 24 or 32)", depth));
        }

        let atoms = Atoms::new(&conn)?.reply().context("Failed to intern atoms")?;
        let resolution = Resolution::new(
            screen.width_in_pixels as u32,
            screen.height_in_pixels as u32,
        );

        let window = conn.generate_id()?;
        let values = CreateWindowAux::new()
            .background_pixel(screen.black_pixel)
            .event_mask(
                EventMask::KEY_PRESS | EventMask::STRUCTURE_NOTIFY | EventMask::EXPOSURE,
            );
        conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            window,
            screen.root,
            0,
            0,
            screen.width_in_pixels,
            screen.height_in_pixels,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &values,
        )?;
        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            WINDOW_TITLE.as_bytes(),
        )?;
        conn.change_property8(
            PropMode::REPLACE,
            window,
            atoms._NET_WM_NAME,
            atoms.UTF8_STRING,
            WINDOW_TITLE.as_bytes(),
        )?;
        conn.change_property32(
            PropMode::REPLACE,
            window,
            atoms.WM_PROTOCOLS,
            AtomEnum::ATOM,
            &[atoms.WM_DELETE_WINDOW],
        )?;

        // Follow root size changes (RandR reconfiguration)
        conn.change_window_attributes(
            screen.root,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::STRUCTURE_NOTIFY),
        )?;

        conn.map_window(window)?;
        conn.flush()?;

        info!(
            "X11 window 0x{:x} mapped ({}x{}, depth {})",
            window, resolution.width, resolution.height, depth
        );

        Ok(Self {
            conn,
            root: screen.root,
            window,
            depth,
            atoms,
            height_px: screen.height_in_pixels,
            height_mm: screen.height_in_millimeters,
            resolution: Cell::new(resolution),
            dpi_override,
        })
    }

    pub fn connection(&self) -> &RustConnection {
        &self.conn
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution.get()
    }

    /// Connection file descriptor for poll(2)
    pub fn as_fd(&self) -> BorrowedFd<'_> {
        self.conn.stream().as_fd()
    }

    /// Non-blocking event read
    pub fn poll_event(&self) -> Result<Option<Event>> {
        Ok(self.conn.poll_for_event()?)
    }

    /// Whether a client message asks the window to close
    pub fn is_close_request(&self, event: &Event) -> bool {
        match event {
            Event::ClientMessage(msg) => {
                msg.window == self.window
                    && msg.type_ == self.atoms.WM_PROTOCOLS
                    && msg.format == 32
                    && msg.data.as_data32()[0] == self.atoms.WM_DELETE_WINDOW
            }
            _ => false,
        }
    }

    /// Handle a root ConfigureNotify; returns true if the resolution changed
    pub fn handle_root_configure(&self, event: &Event) -> Result<bool> {
        let Event::ConfigureNotify(ev) = event else {
            return Ok(false);
        };
        if ev.window != self.root {
            return Ok(false);
        }
        let new = Resolution::new(ev.width as u32, ev.height as u32);
        if new == self.resolution.get() {
            return Ok(false);
        }
        info!("Root resized to {}x{}", new.width, new.height);
        self.resolution.set(new);
        self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new().width(new.width).height(new.height),
        )?;
        self.conn.flush()?;
        Ok(true)
    }

    /// Current monitor layout via RandR (empty if unavailable)
    pub fn query_outputs(&self) -> Vec<Output> {
        match self.try_query_outputs() {
            Ok(outputs) => outputs,
            Err(e) => {
                warn!("RandR monitor query failed, centering on root: {:#}", e);
                Vec::new()
            }
        }
    }

    fn try_query_outputs(&self) -> Result<Vec<Output>> {
        self.conn
            .extension_information(randr::X11_EXTENSION_NAME)?
            .ok_or_else(|| anyhow!("RandR extension not available"))?;
        let reply = self.conn.randr_get_monitors(self.root, true)?.reply()?;
        let outputs: Vec<Output> = reply
            .monitors
            .iter()
            .map(|m| Output::new(m.x as i32, m.y as i32, m.width as u32, m.height as u32))
            .collect();
        for (i, o) in outputs.iter().enumerate() {
            debug!("RandR monitor {}: {}x{}+{}+{}", i, o.width, o.height, o.x, o.y);
        }
        Ok(outputs)
    }

    /// Screen DPI: configured value, else Xft.dpi, else physical size
    pub fn detect_dpi(&self) -> f64 {
        if self.dpi_override > 0.0 {
            return self.dpi_override;
        }
        if let Some(dpi) = self.xft_dpi() {
            debug!("Xft.dpi = {}", dpi);
            return dpi;
        }
        match dpi_from_physical(self.height_px, self.height_mm) {
            Some(dpi) => {
                debug!("DPI from physical screen size: {}", dpi);
                dpi
            }
            None => BASE_DPI,
        }
    }

    /// Xft.dpi from the RESOURCE_MANAGER root property
    fn xft_dpi(&self) -> Option<f64> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                AtomEnum::RESOURCE_MANAGER,
                AtomEnum::STRING,
                0,
                u32::MAX,
            )
            .ok()?
            .reply()
            .ok()?;
        let text = String::from_utf8_lossy(&reply.value);
        parse_xft_dpi(&text)
    }
}

impl GeometryProvider for X11Display {
    fn geometry(&self) -> ScreenGeometry {
        ScreenGeometry {
            outputs: self.query_outputs(),
            resolution: self.resolution(),
            scale: scale_for_dpi(self.detect_dpi()),
        }
    }
}

/// Find `Xft.dpi` in an X resource database string
pub fn parse_xft_dpi(resources: &str) -> Option<f64> {
    resources.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "Xft.dpi" {
            return None;
        }
        value.trim().parse::<f64>().ok().filter(|d| *d > 0.0)
    })
}

/// DPI from the screen's pixel and millimeter heights, rounded
pub fn dpi_from_physical(height_px: u16, height_mm: u16) -> Option<f64> {
    if height_mm == 0 {
        return None;
    }
    Some((height_px as f64 * 25.4 / height_mm as f64).round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xft_dpi() {
        let db = "Xcursor.size:\t24\nXft.dpi:\t144\nXft.antialias:\t1\n";
        assert_eq!(parse_xft_dpi(db), Some(144.0));
        assert_eq!(parse_xft_dpi("Xft.antialias: 1\n"), None);
        assert_eq!(parse_xft_dpi("Xft.dpi: nope\n"), None);
    }

    #[test]
    fn test_dpi_from_physical() {
        // 1080 px over 286 mm ≈ 95.9 → 96
        assert_eq!(dpi_from_physical(1080, 286), Some(96.0));
        assert_eq!(dpi_from_physical(1080, 0), None);
    }
}
