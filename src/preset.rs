//! Crop presets: validation, defaulting, and the built-in set.
//!
//! A [`CropPreset`] is what callers and config files provide. Resolving it
//! parses the ratio once and fills in the display label and overlay color,
//! producing a [`ResolvedPreset`] that the rest of the engine works with.
//!
//! ## Default colors
//!
//! Presets without a color take one from [`DEFAULT_COLORS`] by **position**,
//! not by name: the preset resolved at index 2 always gets the third palette
//! entry. Two sessions with the same preset order therefore paint identical
//! overlays.

use crate::events::ErrorCode;
use crate::ratio::{RatioError, RatioSpec, parse_ratio};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overlay palette used when a preset does not specify a color.
pub const DEFAULT_COLORS: [&str; 10] = [
    "#FF6B6B", // red
    "#4ECDC4", // teal
    "#45B7D1", // blue
    "#96CEB4", // green
    "#FFEAA7", // yellow
    "#DDA0DD", // plum
    "#98D8C8", // mint
    "#F7DC6F", // gold
    "#A29BFE", // lavender
    "#FD79A8", // pink
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PresetError {
    #[error("Preset must have a non-empty name")]
    EmptyName,
    #[error("Preset \"{name}\" must have a ratio value")]
    MissingRatio { name: String },
    #[error("Preset \"{name}\" has invalid ratio: {source}")]
    InvalidRatio {
        name: String,
        #[source]
        source: RatioError,
    },
}

impl PresetError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PresetError::InvalidRatio { .. } => ErrorCode::InvalidRatio,
            _ => ErrorCode::InvalidPreset,
        }
    }
}

/// A named target aspect ratio plus optional display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CropPreset {
    /// Unique key within a registry.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<RatioSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Overlay color (any CSS color value).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CropPreset {
    pub fn new(name: impl Into<String>, ratio: impl Into<RatioSpec>) -> Self {
        Self {
            name: name.into(),
            ratio: Some(ratio.into()),
            label: None,
            color: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A preset with its ratio parsed and defaults applied.
///
/// Only [`resolve_preset`] builds these, so `numeric_ratio` is always
/// positive and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPreset {
    name: String,
    ratio: RatioSpec,
    numeric_ratio: f64,
    label: String,
    color: String,
}

impl ResolvedPreset {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ratio as originally written.
    pub fn ratio(&self) -> &RatioSpec {
        &self.ratio
    }

    pub fn numeric_ratio(&self) -> f64 {
        self.numeric_ratio
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Back to caller-facing form, keeping the resolved label and color.
    pub fn to_preset(&self) -> CropPreset {
        CropPreset {
            name: self.name.clone(),
            ratio: Some(self.ratio.clone()),
            label: Some(self.label.clone()),
            color: Some(self.color.clone()),
        }
    }
}

/// Check that a preset has a name and a parseable ratio.
pub fn validate_preset(preset: &CropPreset) -> Result<(), PresetError> {
    checked_ratio(preset).map(|_| ())
}

fn checked_ratio(preset: &CropPreset) -> Result<(&RatioSpec, f64), PresetError> {
    if preset.name.trim().is_empty() {
        return Err(PresetError::EmptyName);
    }
    let ratio = preset.ratio.as_ref().ok_or_else(|| PresetError::MissingRatio {
        name: preset.name.clone(),
    })?;
    let numeric = parse_ratio(ratio).map_err(|source| PresetError::InvalidRatio {
        name: preset.name.clone(),
        source,
    })?;
    Ok((ratio, numeric))
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Resolve a preset at the given registry position.
///
/// - `label` falls back to `name`
/// - `color` falls back to `DEFAULT_COLORS[index % 10]`
pub fn resolve_preset(preset: &CropPreset, index: usize) -> Result<ResolvedPreset, PresetError> {
    let (ratio, numeric_ratio) = checked_ratio(preset)?;
    let label = non_empty(preset.label.as_ref()).unwrap_or(preset.name.as_str());
    let color = non_empty(preset.color.as_ref())
        .unwrap_or(DEFAULT_COLORS[index % DEFAULT_COLORS.len()]);

    Ok(ResolvedPreset {
        name: preset.name.clone(),
        ratio: ratio.clone(),
        numeric_ratio,
        label: label.to_string(),
        color: color.to_string(),
    })
}

/// The presets a session starts with when none are configured.
pub fn built_in_presets() -> Vec<CropPreset> {
    [
        ("landscape", "16:9", "Landscape 16:9", "#FF6B6B"),
        ("ultrawide", "21:9", "Ultrawide 21:9", "#4ECDC4"),
        ("standard", "4:3", "Standard 4:3", "#45B7D1"),
        ("square", "1:1", "Square 1:1", "#96CEB4"),
        ("portrait", "9:16", "Portrait 9:16", "#FFEAA7"),
        ("social-portrait", "4:5", "Social Portrait 4:5", "#DDA0DD"),
        ("og-image", "1.91:1", "OG Image 1.91:1", "#98D8C8"),
        ("banner", "3:1", "Banner 3:1", "#F7DC6F"),
    ]
    .into_iter()
    .map(|(name, ratio, label, color)| {
        CropPreset::new(name, ratio)
            .with_label(label)
            .with_color(color)
    })
    .collect()
}
