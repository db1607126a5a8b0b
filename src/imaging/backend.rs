//! Image backend trait and shared error type.
//!
//! The [`ImageBackend`] trait covers the two pixel-level operations a crop
//! session needs: probing an image's natural size (the "load") and writing
//! one encoded crop. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::CropExportParams;
use crate::crop::Dimensions;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// `Sync` so batch export can share one backend across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Cut `params.crop` out of the source and write it encoded.
    fn export_crop(&self, params: &CropExportParams) -> Result<(), BackendError>;
}
