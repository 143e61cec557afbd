//! fontconfig integration
//!
//! Search and select the proportional face used for indicator text

use anyhow::{anyhow, Result};
use fontconfig::Fontconfig;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Font search result
#[derive(Debug, Clone)]
pub struct FontMatch {
    /// Font file path
    pub path: PathBuf,
    /// Font name
    pub family: String,
}

/// Search fonts using fontconfig
pub struct FontFinder {
    fc: Fontconfig,
}

impl FontFinder {
    /// Initialize FontFinder
    pub fn new() -> Result<Self> {
        let fc = Fontconfig::new().ok_or_else(|| anyhow!("fontconfig initialization failed"))?;
        info!("fontconfig initialized");
        Ok(Self { fc })
    }

    /// Search by font name
    /// Verifies that the returned font actually matches the requested family name
    /// (fontconfig always returns the "closest" match, even if completely unrelated)
    pub fn find_font(&self, family: &str) -> Option<FontMatch> {
        let font = self.fc.find(family, None)?;
        let req = family.to_ascii_lowercase();
        let got = font.name.to_ascii_lowercase();
        if got.contains(&req) || req.contains(&got) {
            return Some(FontMatch {
                path: font.path,
                family: font.name,
            });
        }
        warn!(
            "fontconfig: rejected false match for \"{}\": got \"{}\"",
            family, font.name
        );
        None
    }

    /// Search for a sans-serif face
    ///
    /// The generic "sans-serif" alias is tried last and accepted whatever
    /// family it resolves to.
    pub fn find_sans(&self) -> Option<FontMatch> {
        let candidates = [
            "DejaVu Sans",
            "Liberation Sans",
            "Noto Sans",
            "Cantarell",
            "Open Sans",
            "FreeSans",
        ];

        for name in candidates {
            if let Some(m) = self.find_font(name) {
                return Some(m);
            }
        }

        if let Some(font) = self.fc.find("sans-serif", None) {
            return Some(FontMatch {
                path: font.path,
                family: font.name,
            });
        }

        warn!("Sans-serif font not found");
        None
    }
}

/// Load font file
pub fn load_font_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| anyhow!("Failed to read font file: {} ({})", path.display(), e))
}

/// Resolve a font specifier: if it's a valid file path, read it directly.
/// Otherwise, treat it as a font family name and search via fontconfig.
pub fn resolve_font(specifier: &str) -> Result<Vec<u8>> {
    let path = Path::new(specifier);
    if path.is_absolute() && path.exists() {
        info!("Font loaded from path: {}", specifier);
        return load_font_file(path);
    }

    let finder = FontFinder::new()?;
    if let Some(font_match) = finder.find_font(specifier) {
        info!(
            "Font resolved by name: \"{}\" → {} ({})",
            specifier,
            font_match.family,
            font_match.path.display()
        );
        return load_font_file(&font_match.path);
    }

    // Last resort: try as relative path
    if path.exists() {
        info!("Font loaded from relative path: {}", specifier);
        return load_font_file(path);
    }

    Err(anyhow!(
        "Font not found: \"{}\" (not a valid path or font name)",
        specifier
    ))
}

/// Search and load the default sans-serif font using fontconfig
pub fn load_system_font_fc() -> Result<Vec<u8>> {
    let finder = FontFinder::new()?;

    if let Some(font_match) = finder.find_sans() {
        info!(
            "System font (fontconfig): {} ({})",
            font_match.family,
            font_match.path.display()
        );
        return load_font_file(&font_match.path);
    }

    Err(anyhow!("Sans-serif font not found via fontconfig"))
}

/// Load the configured face, falling back to the system default
///
/// An empty specifier selects the system default directly.
pub fn load_configured_font(specifier: &str) -> Result<Vec<u8>> {
    if specifier.is_empty() {
        return load_system_font_fc();
    }
    match resolve_font(specifier) {
        Ok(data) => Ok(data),
        Err(e) => {
            warn!("{} (falling back to system font)", e);
            load_system_font_fc()
        }
    }
}
