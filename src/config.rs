// src/config.rs

//! Defines the configuration structures for the screen.
//!
//! Settings are grouped into sections that deserialize from JSON. Every
//! section carries `#[serde(default)]`, so a config file only needs to name
//! the values it changes; an empty object is a valid config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::atlas::AtlasGeometry;
use crate::color::{NamedColor, PaletteColor};

/// Environment variable naming a JSON config file to load at startup.
pub const CONFIG_ENV_VAR: &str = "ASCII_SCREEN_CONFIG";

/// Process-wide configuration, loaded on first access.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

/// Root of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct Config {
    pub screen: ScreenConfig,
    pub atlas: AtlasConfig,
    pub colors: ColorScheme,
}

/// Grid size in characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub columns: u16,
    pub rows: u16,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            columns: 80,
            rows: 24,
        }
    }
}

/// Where the glyph sheet comes from and how it is laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AtlasConfig {
    /// Image file holding the glyph sheet. Without one, a blank sheet is used.
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub geometry: AtlasGeometry,
}

/// Default colors for writes and clears that do not name their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub foreground: PaletteColor,
    pub background: PaletteColor,
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme {
            foreground: NamedColor::White.into(),
            background: NamedColor::Black.into(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse config JSON")
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Loads the file named by `ASCII_SCREEN_CONFIG`, falling back to defaults
    /// when the variable is unset or the file is unusable.
    pub fn load_or_default() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            info!("{} not set, using default configuration.", CONFIG_ENV_VAR);
            return Config::default();
        };
        match Config::load(&path) {
            Ok(config) => {
                info!("Configuration loaded from {}.", PathBuf::from(&path).display());
                config
            }
            Err(e) => {
                warn!("{:#}. Using default configuration.", e);
                Config::default()
            }
        }
    }
}
