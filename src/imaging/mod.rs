//! Image I/O in pure Rust, with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Crop** | `DynamicImage::crop_imm` |
//! | **Encode** | PNG, JPEG (quality) or lossless WebP |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing an export
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Exporter, planning, and parallel batch export

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use operations::{
    ExportError, ExportResult, ExportedCrop, Exporter, export_all, export_crop, plan_export,
    select_crops,
};
pub use params::{CropExportParams, ExportFormat, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
