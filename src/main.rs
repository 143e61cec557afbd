//! lockring - unlock indicator for X11 screen lockers
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │   Event Loop (poll on X11 fd + timers)   │
//! ├──────────────────────────────────────────┤
//! │  Key input → Session state               │
//! │                   ↓                      │
//! │  Redraw scheduler (events + clock tick)  │
//! │                   ↓                      │
//! │  Compositor (background + indicator)     │
//! │                   ↓                      │
//! │  Presentation (window background swap)   │
//! └──────────────────────────────────────────┘
//! ```

mod config;
mod constants;
mod display;
mod drawing;
mod font;
mod input;
mod redraw;
mod render;
mod session;
mod utils;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn, LevelFilter};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags};
use rand::Rng;
use x11rb::protocol::Event;

use config::Config;
use display::geometry::{scale_for_dpi, Output, Resolution, ScreenGeometry};
use display::{PngPresenter, Presenter, X11Display, X11Presenter};
use font::FontdueFace;
use input::keycodes::from_x11_keycode;
use input::{KeyAction, Modifiers, PreviewInput};
use redraw::{FactSettings, Redrawer, Trigger};
use render::{Background, Compositor, CompositorSettings};
use session::{signals, AuthState, InputState, SessionFacts, SessionState};

/// Resolution used by `--render` when neither outputs nor a size are given
const DEFAULT_RENDER_RESOLUTION: Resolution = Resolution {
    width: 1920,
    height: 1080,
};

/// Command line options
#[derive(Debug, Default)]
struct Args {
    help: bool,
    version: bool,
    debug: bool,
    init_config: bool,
    force: bool,
    config: Option<PathBuf>,
    render: Option<PathBuf>,
    outputs: Option<String>,
    resolution: Option<String>,
    scale: Option<f64>,
    state: Option<String>,
    elapsed: Option<u64>,
}

impl Args {
    fn parse(mut argv: impl Iterator<Item = String>) -> Result<Self> {
        let mut args = Args::default();
        while let Some(arg) = argv.next() {
            // Accept both `--opt value` and `--opt=value`
            let (name, inline) = match arg.split_once('=') {
                Some((n, v)) if n.starts_with("--") => (n.to_string(), Some(v.to_string())),
                _ => (arg.clone(), None),
            };
            let mut value = |name: &str| -> Result<String> {
                inline
                    .clone()
                    .or_else(|| argv.next())
                    .ok_or_else(|| anyhow!("{} requires a value", name))
            };
            match name.as_str() {
                "-h" | "--help" => args.help = true,
                "-V" | "--version" => args.version = true,
                "-d" | "--debug" => args.debug = true,
                "--init-config" => args.init_config = true,
                "-f" | "--force" => args.force = true,
                "-c" | "--config" => args.config = Some(PathBuf::from(value(&name)?)),
                "--render" => args.render = Some(PathBuf::from(value(&name)?)),
                "--outputs" => args.outputs = Some(value(&name)?),
                "--resolution" => args.resolution = Some(value(&name)?),
                "--scale" => {
                    let v = value(&name)?;
                    let scale: f64 = v.parse().with_context(|| format!("Invalid scale \"{}\"", v))?;
                    if !(scale > 0.0 && scale.is_finite()) {
                        return Err(anyhow!("Scale must be positive, got {}", v));
                    }
                    args.scale = Some(scale);
                }
                "--state" => args.state = Some(value(&name)?),
                "--elapsed" => {
                    let v = value(&name)?;
                    args.elapsed =
                        Some(v.parse().with_context(|| format!("Invalid seconds \"{}\"", v))?);
                }
                other => return Err(anyhow!("Unknown option: {} (see --help)", other)),
            }
        }
        Ok(args)
    }
}

/// Print help message
fn print_help() {
    println!(
        r#"lockring {} - unlock indicator for X11 screen lockers

USAGE:
    lockring [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    -d, --debug             Verbose logging
    -c, --config PATH       Use this config file
    --init-config           Write the default config file
    -f, --force             Overwrite config file without confirmation

PREVIEW (default):
    Opens a window showing the indicator and drives it from the keyboard:
    typing/BackSpace show key feedback, Return simulates a rejected attempt,
    Escape clears, F1-F5 force Idle/Verifying/Locking/Wrong/Lock failed.

RENDER:
    --render PATH           Composite one frame to a PNG file and exit
                            (a directory gets lockring_YYYYmmdd_HHMMSS.png)
    --outputs LIST          Output layout, e.g. 1920x1080+0+0,1280x1024+1920+0
    --resolution WxH        Virtual screen size (default: bounding box of outputs)
    --scale F               Display scale factor (default: from display.dpi)
    --state LIST            States to show, e.g. wrong,key
                            (idle, key, backspace, nothing, verifying,
                             locking, wrong, lockfailed)
    --elapsed SECS          Time since the session was locked

CONFIG FILE:
    ~/.config/lockring/config.toml
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Logger writes everything RUST_LOG allows; without RUST_LOG the level is
/// capped at warn, or debug when asked for
fn init_logging(debug: bool) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .try_init();
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        });
    }
}

fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;

    if args.help {
        print_help();
        return Ok(());
    }
    if args.version {
        println!("lockring {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(args.debug);

    if args.init_config {
        return init_config(&args);
    }

    let cfg = Config::load(args.config.as_deref());
    if cfg.debug && !args.debug {
        init_logging(true);
    }
    info!("lockring starting...");

    let font_data = font::load_configured_font(&cfg.indicator.font)
        .context("No usable font for the indicator")?;
    let face = FontdueFace::from_bytes(font_data)?;

    let compositor = Compositor::new(
        CompositorSettings::from(&cfg.indicator),
        Background::from_config(&cfg.background),
        Box::new(face),
        rand::thread_rng(),
    );

    match &args.render {
        Some(path) => render_snapshot(&args, &cfg, compositor, path.clone()),
        None => run_preview(&cfg, compositor),
    }
}

/// Write the default config, asking before overwriting
fn init_config(args: &Args) -> Result<()> {
    let target = match &args.config {
        Some(p) => p.clone(),
        None => config::default_config_path().ok_or_else(|| anyhow!("Config directory not found"))?,
    };
    if target.exists() && !args.force {
        println!("Config file already exists: {}", target.display());
        print!("Overwrite? [y/N]: ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();
        if input != "y" && input != "yes" {
            println!("Aborted");
            return Ok(());
        }
    }
    let path = Config::write_default_config(Some(&target))?;
    println!("Config written: {}", path.display());
    Ok(())
}

fn fact_settings(cfg: &Config) -> FactSettings {
    FactSettings {
        login: cfg.indicator.login_name(),
        authorized_lock_minutes: cfg.indicator.authorized_lock_minutes,
    }
}

/// Apply a `--state` list such as `wrong,key` to a fresh session
fn apply_state_names(state: &mut SessionState, names: &str) -> Result<()> {
    for name in names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.to_ascii_lowercase().as_str() {
            "idle" => {
                state.input = InputState::Idle;
                state.set_auth(AuthState::Idle);
            }
            "key" => state.input = InputState::KeyActive,
            "backspace" => state.input = InputState::BackspaceActive,
            "nothing" => state.input = InputState::NothingToDelete,
            "verifying" => state.set_auth(AuthState::Verifying),
            "locking" => state.set_auth(AuthState::Locking),
            "wrong" => state.record_failure(None),
            "lockfailed" => state.set_auth(AuthState::LockFailed),
            other => return Err(anyhow!("Unknown state \"{}\"", other)),
        }
    }
    Ok(())
}

/// Geometry for `--render`: explicit outputs and/or size, else a default
/// single screen
fn render_geometry(args: &Args, cfg: &Config) -> Result<ScreenGeometry> {
    let outputs: Vec<Output> = match &args.outputs {
        Some(list) => ScreenGeometry::parse_outputs(list)?,
        None => Vec::new(),
    };
    let resolution = match &args.resolution {
        Some(size) => Resolution::parse(size)?,
        None => ScreenGeometry::bounding_resolution(&outputs).unwrap_or(DEFAULT_RENDER_RESOLUTION),
    };
    if resolution.width == 0 || resolution.height == 0 {
        return Err(anyhow!("Resolution must not be empty"));
    }
    let scale = args.scale.unwrap_or_else(|| scale_for_dpi(cfg.display.dpi));
    Ok(ScreenGeometry {
        outputs,
        resolution,
        scale,
    })
}

/// Composite one frame and write it as PNG
fn render_snapshot<R: Rng>(
    args: &Args,
    cfg: &Config,
    mut compositor: Compositor<R>,
    path: PathBuf,
) -> Result<()> {
    let geometry = render_geometry(args, cfg)?;
    let start = Instant::now();
    let mut state = SessionState::new(start);
    if let Some(names) = &args.state {
        apply_state_names(&mut state, names)?;
    }
    let now = start + Duration::from_secs(args.elapsed.unwrap_or(0));
    let settings = fact_settings(cfg);
    let facts = SessionFacts::collect(
        &state,
        settings.login.as_deref(),
        settings.authorized_lock_minutes,
        now,
    );

    let frame = compositor.composite(&facts, state.input, state.auth, &geometry);
    let mut presenter = if path.is_dir() {
        PngPresenter::timestamped(&path)
    } else {
        PngPresenter::new(path)
    };
    presenter
        .present(&frame)
        .with_context(|| format!("Failed to write {}", presenter.path().display()))?;
    println!("Frame written: {}", presenter.path().display());
    Ok(())
}

/// Milliseconds for poll(2): rounded up so the loop never wakes just
/// before a deadline; -1 blocks until the next event
fn poll_timeout_ms(timeout: Option<Duration>) -> i32 {
    match timeout {
        Some(d) => ((d.as_micros() + 999) / 1000).min(i32::MAX as u128) as i32,
        None => -1,
    }
}

/// Interactive preview window
fn run_preview<R: Rng>(cfg: &Config, compositor: Compositor<R>) -> Result<()> {
    signals::setup_signal_handlers()?;

    let display = X11Display::connect(cfg.display.dpi)?;
    let presenter = X11Presenter::new(&display).context("Failed to set up presentation")?;
    let mut redrawer = Redrawer::new(compositor, presenter, &display, fact_settings(cfg));

    let start = Instant::now();
    let mut state = SessionState::new(start);
    let mut input = PreviewInput::new();

    redrawer.start_periodic(start);
    redrawer.request_redraw();
    info!("Preview loop started");

    loop {
        if signals::shutdown_requested() {
            info!("Received shutdown signal, exiting");
            break;
        }

        redrawer.run_due(&mut state, Instant::now());

        while let Some(event) = display.poll_event()? {
            if display.is_close_request(&event) {
                info!("Window closed");
                return Ok(());
            }
            match &event {
                Event::KeyPress(ev) => {
                    let Some(keycode) = from_x11_keycode(ev.detail) else {
                        continue;
                    };
                    let mods = Modifiers::from_x11_state(u16::from(ev.state));
                    let now = Instant::now();
                    match input.handle_key(keycode, mods, &mut state) {
                        KeyAction::Ignored => {}
                        KeyAction::Redraw { arm_clear } => {
                            if arm_clear {
                                redrawer.scheduler_mut().arm_clear(now);
                            }
                            redrawer.request_redraw();
                        }
                        KeyAction::Clear => {
                            redrawer.scheduler_mut().cancel_clear();
                            redrawer.scheduler_mut().request(Trigger::ClearIndicator);
                        }
                    }
                }
                Event::ConfigureNotify(_) => {
                    if display.handle_root_configure(&event)? {
                        redrawer.start_periodic(Instant::now());
                        redrawer.request_redraw();
                    }
                }
                Event::Error(e) => warn!("X11 error: {:?}", e),
                _ => {}
            }
        }

        let timeout = redrawer.scheduler().poll_timeout(Instant::now());
        if timeout == Some(Duration::ZERO) {
            continue;
        }
        let fd = display.as_fd();
        let mut fds = [PollFd::new(&fd, PollFlags::POLLIN)];
        match poll(&mut fds, poll_timeout_ms(timeout)) {
            Ok(_) => {}
            // A shutdown signal ends the wait; the flag is checked next
            Err(Errno::EINTR) => debug!("poll interrupted by a signal"),
            Err(e) => return Err(anyhow!("poll failed: {}", e)),
        }
    }

    redrawer.stop_periodic();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_render_args() {
        let args = parse(&[
            "--render",
            "/tmp/out.png",
            "--outputs=1920x1080+0+0,1280x1024+1920+0",
            "--scale",
            "2",
            "--state",
            "wrong,key",
        ])
        .unwrap();
        assert_eq!(args.render, Some(PathBuf::from("/tmp/out.png")));
        assert_eq!(args.outputs.as_deref(), Some("1920x1080+0+0,1280x1024+1920+0"));
        assert_eq!(args.scale, Some(2.0));
        assert_eq!(args.state.as_deref(), Some("wrong,key"));
    }

    #[test]
    fn test_parse_rejects_bad_args() {
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--scale", "0"]).is_err());
        assert!(parse(&["--render"]).is_err());
    }

    #[test]
    fn test_state_names() {
        let mut state = SessionState::new(Instant::now());
        apply_state_names(&mut state, "wrong, backspace").unwrap();
        assert_eq!(state.auth, AuthState::Wrong);
        assert_eq!(state.input, InputState::BackspaceActive);
        assert_eq!(state.failed_attempts(), 1);
        assert!(apply_state_names(&mut state, "sleepy").is_err());
    }

    #[test]
    fn test_render_geometry_defaults() {
        let cfg = Config::default();
        let args = parse(&["--outputs", "800x600+0+0,800x600+800+0"]).unwrap();
        let geo = render_geometry(&args, &cfg).unwrap();
        assert_eq!(geo.resolution, Resolution::new(1600, 600));
        assert_eq!(geo.outputs.len(), 2);
        assert_eq!(geo.scale, 1.0);

        let geo = render_geometry(&parse(&[]).unwrap(), &cfg).unwrap();
        assert_eq!(geo.resolution, DEFAULT_RENDER_RESOLUTION);
        assert!(geo.outputs.is_empty());
    }

    #[test]
    fn test_poll_timeout_rounds_up() {
        assert_eq!(poll_timeout_ms(None), -1);
        assert_eq!(poll_timeout_ms(Some(Duration::from_micros(1))), 1);
        assert_eq!(poll_timeout_ms(Some(Duration::from_secs(1))), 1000);
    }
}
