//! Parameter types for crop export.
//!
//! These structs describe *what* to write, not *how*. They sit between the
//! high-level [`operations`](super::operations) module (which decides which
//! crops to export and where) and the [`backend`](super::backend) (which
//! does the pixel work), so a mock backend can stand in during tests.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 92). Clamped on construction.
//! - [`ExportFormat`]: Output encoding: PNG, JPEG or lossless WebP.
//! - [`CropExportParams`]: Full specification for one crop: source, output, rectangle, format, quality.

use crate::crop::CropRect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(92)
    }
}

/// Encoded output format for exported crops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
        }
    }

    /// Whether [`Quality`] affects the encoder.
    pub fn is_lossy(self) -> bool {
        matches!(self, ExportFormat::Jpeg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            other => Err(format!(
                "unknown export format '{other}' (expected png, jpeg or webp)"
            )),
        }
    }
}

/// Parameters for exporting one crop of a source image.
#[derive(Debug, Clone, PartialEq)]
pub struct CropExportParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Region of the source, in source pixels.
    pub crop: CropRect,
    pub format: ExportFormat,
    pub quality: Quality,
}
