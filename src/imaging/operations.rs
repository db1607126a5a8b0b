//! High-level crop export.
//!
//! These functions turn a computed crop set into export jobs and hand them to
//! a backend. Planning is separate from execution so the parameter logic can
//! be tested without encoding anything.
//!
//! Each preset's export is independent: one failure never aborts the batch,
//! and [`export_all`] returns one result per requested crop in the order the
//! crops were given.

use super::backend::{BackendError, ImageBackend};
use super::params::{CropExportParams, ExportFormat, Quality};
use crate::crop::CropRect;
use crate::events::ErrorCode;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export directory not found: {}", .0.display())]
    ContainerNotFound(PathBuf),
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Preset name cannot be used as a file name: {0:?}")]
    InvalidFileName(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ExportError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ExportError::ContainerNotFound(_) => Some(ErrorCode::ContainerNotFound),
            ExportError::UnknownPreset(_) | ExportError::InvalidFileName(_) => {
                Some(ErrorCode::InvalidPreset)
            }
            ExportError::Backend(_) => None,
        }
    }
}

/// Where and how crops are written.
#[derive(Debug, Clone, PartialEq)]
pub struct Exporter {
    dir: PathBuf,
    format: ExportFormat,
    quality: Quality,
}

impl Exporter {
    /// Target an existing directory. Nothing is created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(ExportError::ContainerNotFound(dir));
        }
        Ok(Self {
            dir,
            format: ExportFormat::default(),
            quality: Quality::default(),
        })
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// `<dir>/<preset>.<ext>`
    ///
    /// Names that would leave the directory or name a subdirectory are
    /// rejected.
    pub fn output_path(&self, preset: &str) -> Result<PathBuf, ExportError> {
        if !is_plain_file_stem(preset) {
            return Err(ExportError::InvalidFileName(preset.to_string()));
        }
        Ok(self
            .dir
            .join(format!("{}.{}", preset, self.format.extension())))
    }
}

fn is_plain_file_stem(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// A crop written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedCrop {
    pub preset: String,
    pub path: PathBuf,
    pub crop: CropRect,
}

/// Outcome of one preset's export.
#[derive(Debug)]
pub struct ExportResult {
    pub preset: String,
    pub outcome: Result<ExportedCrop, ExportError>,
}

/// Plan a crop export without executing it.
pub fn plan_export(
    exporter: &Exporter,
    source: &Path,
    preset: &str,
    crop: CropRect,
) -> Result<CropExportParams, ExportError> {
    Ok(CropExportParams {
        source: source.to_path_buf(),
        output: exporter.output_path(preset)?,
        crop,
        format: exporter.format,
        quality: exporter.quality,
    })
}

/// Export a single crop.
pub fn export_crop(
    backend: &impl ImageBackend,
    exporter: &Exporter,
    source: &Path,
    preset: &str,
    crop: CropRect,
) -> Result<ExportedCrop, ExportError> {
    let params = plan_export(exporter, source, preset, crop)?;
    backend.export_crop(&params)?;
    Ok(ExportedCrop {
        preset: preset.to_string(),
        path: params.output,
        crop,
    })
}

/// Narrow an ordered crop list to the requested preset names.
///
/// An empty `only` keeps every crop. Order follows `crops`, not `only`.
pub fn select_crops(
    crops: Vec<(String, CropRect)>,
    only: &[String],
) -> Result<Vec<(String, CropRect)>, ExportError> {
    if only.is_empty() {
        return Ok(crops);
    }
    if let Some(unknown) = only.iter().find(|name| !crops.iter().any(|(n, _)| n == *name)) {
        return Err(ExportError::UnknownPreset(unknown.clone()));
    }
    Ok(crops
        .into_iter()
        .filter(|(name, _)| only.contains(name))
        .collect())
}

/// Export every crop in parallel.
///
/// Runs on the current rayon pool. Results come back in the order of
/// `crops`, whatever order the workers finish in.
pub fn export_all(
    backend: &impl ImageBackend,
    exporter: &Exporter,
    source: &Path,
    crops: &[(String, CropRect)],
) -> Vec<ExportResult> {
    let results: Vec<ExportResult> = crops
        .par_iter()
        .map(|(preset, crop)| {
            let outcome = export_crop(backend, exporter, source, preset, *crop);
            if let Err(err) = &outcome {
                warn!(preset = %preset, "export failed: {err}");
            }
            ExportResult {
                preset: preset.clone(),
                outcome,
            }
        })
        .collect();

    let written = results.iter().filter(|r| r.outcome.is_ok()).count();
    info!(
        written,
        failed = results.len() - written,
        dir = %exporter.dir.display(),
        "export finished"
    );
    results
}
