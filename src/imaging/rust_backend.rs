//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only, no full decode) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (RGB8, configurable quality) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless, RGBA8) |

use super::backend::{BackendError, ImageBackend};
use super::params::{CropExportParams, ExportFormat};
use crate::crop::{CropRect, Dimensions};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Extensions the compiled-in decoders may accept.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Fit a computed crop to the decoded image.
///
/// Crop rounding can overshoot the right or bottom edge by a pixel.
fn fit_crop(crop: CropRect, width: u32, height: u32) -> Result<CropRect, BackendError> {
    let x = crop.x.min(width);
    let y = crop.y.min(height);
    let fitted = CropRect {
        x,
        y,
        width: crop.width.min(width - x),
        height: crop.height.min(height - y),
    };
    if fitted.width == 0 || fitted.height == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "Crop {}x{}+{}+{} lies outside the {width}x{height} image",
            crop.width, crop.height, crop.x, crop.y
        )));
    }
    Ok(fitted)
}

/// Encode and write a crop in the requested format.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: ExportFormat,
    quality: u32,
) -> Result<(), BackendError> {
    let file = File::create(path).map_err(BackendError::Io)?;
    let writer = BufWriter::new(file);

    let result = match format {
        ExportFormat::Png => img.write_with_encoder(PngEncoder::new(writer)),
        ExportFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, quality as u8))
        }
        ExportFormat::Webp => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(writer))
        }
    };
    result.map_err(|e| BackendError::ProcessingFailed(format!("{format} encode failed: {e}")))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn export_crop(&self, params: &CropExportParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let crop = fit_crop(params.crop, img.width(), img.height())?;
        debug!(
            output = %params.output.display(),
            x = crop.x,
            y = crop.y,
            width = crop.width,
            height = crop.height,
            "exporting crop"
        );
        let cropped = img.crop_imm(crop.x, crop.y, crop.width, crop.height);
        save_image(
            &cropped,
            &params.output,
            params.format,
            params.quality.value(),
        )
    }
}
