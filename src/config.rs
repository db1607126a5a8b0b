//! Session configuration.
//!
//! Handles loading, validating, and merging `focal-crop.toml` files. Every
//! field has a default, and all defaults live in the `Default` impls below:
//! the stock configuration is serialized to a TOML table, the user's file is
//! merged over it key by key, and the merged table is deserialized and
//! validated into one fully-resolved [`SessionConfig`].
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [focal_point]
//! x = 50.0                  # Initial focal point, percent of width
//! y = 50.0                  # Initial focal point, percent of height
//!
//! [[presets]]               # Replaces the built-in list entirely
//! name = "landscape"
//! ratio = "16:9"            # "W:H", "W/H", "1.91" or a number
//! label = "Landscape 16:9"  # Optional, defaults to name
//! color = "#FF6B6B"         # Optional, defaults to palette by position
//!
//! [display]
//! layout = "grid"           # "grid" or "single"
//! theme = "light"           # "light" or "dark"
//! show_overlay = true
//! show_dimensions = true
//!
//! [export]
//! format = "png"            # "png", "jpeg" or "webp"
//! quality = 92              # JPEG quality (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel export workers (omit for auto = CPU cores)
//!
//! [logging]
//! level = "info"            # tracing filter; RUST_LOG takes precedence
//! json = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::focal::FocalPoint;
use crate::imaging::ExportFormat;
use crate::preset::{CropPreset, built_in_presets};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Fully-resolved session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Initial focal point.
    pub focal_point: FocalPoint,
    /// Crop presets, in display order.
    pub presets: Vec<CropPreset>,
    /// Display flags consumed by rendering collaborators.
    pub display: DisplayConfig,
    /// Crop export settings.
    pub export: ExportConfig,
    /// Parallel export settings.
    pub processing: ProcessingConfig,
    pub logging: LoggingConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            focal_point: FocalPoint::CENTER,
            presets: built_in_presets(),
            display: DisplayConfig::default(),
            export: ExportConfig::default(),
            processing: ProcessingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Validate config values are within acceptable ranges.
    ///
    /// Individual presets are not checked here: invalid presets are dropped
    /// with a warning when the session builds its registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let FocalPoint { x, y } = self.focal_point;
        if !(x.is_finite() && y.is_finite()) || !self.focal_point.is_within_bounds() {
            return Err(ConfigError::Validation(
                "focal_point.x and focal_point.y must be 0-100".into(),
            ));
        }
        if self.presets.is_empty() {
            return Err(ConfigError::Validation("presets must not be empty".into()));
        }
        if !(1..=100).contains(&self.export.quality) {
            return Err(ConfigError::Validation(
                "export.quality must be 1-100".into(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging.level must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Preview layout mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    Single,
}

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layout::Grid => "grid",
            Layout::Single => "single",
        })
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub layout: Layout,
    pub theme: Theme,
    /// Draw crop rectangles over the source image.
    pub show_overlay: bool,
    /// Show pixel dimensions under each preview.
    pub show_dimensions: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Grid,
            theme: Theme::Light,
            show_overlay: true,
            show_dimensions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// Lossy encoding quality (1-100). Only JPEG uses it.
    pub quality: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 92,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel export workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, e.g. `"info"` or `"focal_crop=debug"`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// A partial update applied to a live session.
///
/// Each present field is applied on its own; absent fields leave the
/// session untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigUpdate {
    pub src: Option<String>,
    pub focal_point: Option<FocalPoint>,
    pub layout: Option<Layout>,
    pub theme: Option<Theme>,
    pub show_overlay: Option<bool>,
    pub show_dimensions: Option<bool>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SessionConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user's
///   `[[presets]]` list replaces the built-in one rather than extending it.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SessionConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SessionConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the session config.
///
/// With no path the stock defaults are returned. A given path must exist.
pub fn load_config(path: Option<&Path>) -> Result<SessionConfig, ConfigError> {
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# focal-crop configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Initial focal point, in percent of the image (0-100 per axis)
# ---------------------------------------------------------------------------
[focal_point]
x = 50.0
y = 50.0

# ---------------------------------------------------------------------------
# Display
# ---------------------------------------------------------------------------
[display]
# Preview layout: "grid" or "single".
layout = "grid"
# Color theme: "light" or "dark".
theme = "light"
# Draw crop rectangles over the source image.
show_overlay = true
# Show pixel dimensions under each preview.
show_dimensions = true

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Output format: "png", "jpeg" or "webp".
format = "png"
# JPEG quality (1 = worst, 100 = best). Ignored by PNG and lossless WebP.
quality = 92

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel export workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# tracing filter directive. The RUST_LOG environment variable wins.
level = "info"
# Emit JSON lines instead of human-readable output.
json = false

# ---------------------------------------------------------------------------
# Presets
# ---------------------------------------------------------------------------
# Defining any [[presets]] replaces this whole list.
# ratio accepts "W:H", "W/H", a decimal string, or a number.
# label defaults to name; color defaults to a palette entry by position.
# Invalid or duplicate presets are skipped with a warning.

[[presets]]
name = "landscape"
ratio = "16:9"
label = "Landscape 16:9"
color = "#FF6B6B"

[[presets]]
name = "ultrawide"
ratio = "21:9"
label = "Ultrawide 21:9"
color = "#4ECDC4"

[[presets]]
name = "standard"
ratio = "4:3"
label = "Standard 4:3"
color = "#45B7D1"

[[presets]]
name = "square"
ratio = "1:1"
label = "Square 1:1"
color = "#96CEB4"

[[presets]]
name = "portrait"
ratio = "9:16"
label = "Portrait 9:16"
color = "#FFEAA7"

[[presets]]
name = "social-portrait"
ratio = "4:5"
label = "Social Portrait 4:5"
color = "#DDA0DD"

[[presets]]
name = "og-image"
ratio = "1.91:1"
label = "OG Image 1.91:1"
color = "#98D8C8"

[[presets]]
name = "banner"
ratio = "3:1"
label = "Banner 3:1"
color = "#F7DC6F"
"##
}
