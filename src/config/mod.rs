//! Configuration file management
//!
//! Loads TOML configuration files and provides application settings.
//! Default config path: ~/.config/lockring/config.toml
//!
//! Configuration is read once at startup; the compositor and scheduler
//! only ever see it by shared reference.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_AUTHORIZED_LOCK_MINUTES, DEFAULT_LOGOUT_HINT};
use crate::utils::{parse_hex_color, parse_hex_color_to_rgba, Rgba};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Verbose logging (same as RUST_LOG=debug)
    pub debug: bool,
    /// Unlock indicator settings
    pub indicator: IndicatorConfig,
    /// Background settings
    pub background: BackgroundConfig,
    /// Display settings
    pub display: DisplayConfig,
}

/// Unlock indicator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Draw the indicator at all (background only when false)
    pub enabled: bool,
    /// Show "N failed attempts" below the time
    pub show_failed_attempts: bool,
    /// Show the login name below the status line
    pub show_login: bool,
    /// Login name to show (empty = $USER)
    pub login: String,
    /// Minutes after which the ring turns red and the logout hint appears
    pub authorized_lock_minutes: u64,
    /// Text of the logout hint banner
    pub logout_hint: String,
    /// Font: family name or file path (searches system fonts if empty)
    pub font: String,
}

/// Background settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Fill color (RRGGBB), used when no image is set
    pub color: String,
    /// PNG or JPEG image path (empty = solid color)
    pub image: String,
    /// Repeat the image to cover the screen instead of painting it once
    pub tile: bool,
}

/// Display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Screen DPI (0 = detect from Xft.dpi or the physical screen size)
    pub dpi: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            indicator: IndicatorConfig::default(),
            background: BackgroundConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_failed_attempts: false,
            show_login: false,
            login: String::new(),
            authorized_lock_minutes: DEFAULT_AUTHORIZED_LOCK_MINUTES,
            logout_hint: DEFAULT_LOGOUT_HINT.to_string(),
            font: String::new(),
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            color: "ffffff".to_string(),
            image: String::new(),
            tile: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { dpi: 0.0 }
    }
}

impl IndicatorConfig {
    /// Login name to render, if enabled
    pub fn login_name(&self) -> Option<String> {
        if !self.show_login {
            return None;
        }
        if !self.login.is_empty() {
            return Some(self.login.clone());
        }
        std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .ok()
            .filter(|s| !s.is_empty())
    }
}

impl BackgroundConfig {
    /// Background fill color
    pub fn color_rgba(&self) -> Rgba {
        parse_hex_color_to_rgba(&self.color)
    }

    /// Configured image path, if any
    pub fn image_path(&self) -> Option<&Path> {
        if self.image.is_empty() {
            None
        } else {
            Some(Path::new(&self.image))
        }
    }
}

impl Config {
    /// System-wide config path
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/lockring/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. LOCKRING_CONFIG environment variable
        if let Ok(path) = std::env::var("LOCKRING_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
        }

        // 2. User config: ~/.config/lockring/config.toml
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. System config: /etc/lockring/config.toml
        let system_config = Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. Explicit path (--config)
    /// 2. LOCKRING_CONFIG environment variable
    /// 3. ~/.config/lockring/config.toml (user config)
    /// 4. /etc/lockring/config.toml (system config)
    /// 5. Built-in defaults
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = explicit.map(Path::to_path_buf).or_else(Self::config_path);
        if let Some(path) = path {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    /// Replace invalid values with defaults so later stages never revalidate
    fn validate(&mut self) {
        if parse_hex_color(&self.background.color).is_none() {
            warn!(
                "Invalid background color \"{}\", using ffffff",
                self.background.color
            );
            self.background.color = BackgroundConfig::default().color;
        }
        if self.display.dpi < 0.0 || !self.display.dpi.is_finite() {
            warn!("Invalid dpi {}, detecting instead", self.display.dpi);
            self.display.dpi = 0.0;
        }
    }

    /// Write the built-in defaults to `path` (or the user config path)
    pub fn write_default_config(path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()
                .ok_or_else(|| anyhow::anyhow!("Config directory not found"))?,
        };
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let body = toml::to_string_pretty(&Self::default())?;
        let template = format!(
            "# lockring configuration\n#\n# background.color is RRGGBB; background.image takes precedence when set.\n# display.dpi = 0 detects the DPI from Xft.dpi or the screen size.\n\n{}",
            body
        );
        std::fs::write(&config_path, template)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lockring").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert!(cfg.indicator.enabled);
        assert!(!cfg.indicator.show_failed_attempts);
        assert_eq!(cfg.background.color, "ffffff");
        assert_eq!(cfg.indicator.logout_hint, "Super + Shift + E to logout");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
            [indicator]
            show_failed_attempts = true

            [background]
            color = "1d2021"
            "#,
        )
        .unwrap();
        assert!(cfg.indicator.show_failed_attempts);
        assert!(cfg.indicator.enabled);
        assert_eq!(cfg.background.color, "1d2021");
        assert!(!cfg.background.tile);
    }

    #[test]
    fn test_invalid_color_is_replaced() {
        let cfg = Config::from_toml("[background]\ncolor = \"nothex\"\n").unwrap();
        assert_eq!(cfg.background.color, "ffffff");
    }

    #[test]
    fn test_login_name() {
        let mut ind = IndicatorConfig::default();
        ind.login = "alice".into();
        assert_eq!(ind.login_name(), None);
        ind.show_login = true;
        assert_eq!(ind.login_name().as_deref(), Some("alice"));
    }

    #[test]
    fn test_default_config_round_trips() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let cfg = Config::from_toml(&text).unwrap();
        assert_eq!(cfg.indicator.authorized_lock_minutes, DEFAULT_AUTHORIZED_LOCK_MINUTES);
    }
}
