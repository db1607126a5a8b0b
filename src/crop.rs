//! Crop rectangle calculation.
//!
//! All functions here are pure: no I/O, no state, no failure modes. Inputs
//! are assumed validated (`width`, `height` > 0, ratio positive and finite).
//!
//! ## Algorithm
//!
//! 1. Take the largest rectangle of the target ratio that fits the image.
//!    A target wider than the image is width-bound; otherwise height-bound.
//! 2. Center it on the focal point (converted from percent to pixels).
//! 3. Clamp so it stays inside the image. A focal point near an edge pulls
//!    the crop flush against that edge instead of centering on it.
//! 4. Round to whole pixels.
//!
//! ```text
//! 4000 × 3000 image, focal (50, 50), 16:9
//!   width-bound: 4000 × 2250
//!   centered:    y = 1500 − 1125 = 375
//!   → { x: 0, y: 375, width: 4000, height: 2250 }
//! ```

use crate::focal::FocalPoint;
use crate::preset::ResolvedPreset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Natural pixel size of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Crop rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Preset name → crop rectangle for the current image and focal point.
pub type CropSet = BTreeMap<String, CropRect>;

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    // max() first so a NaN focal coordinate collapses to `min`
    value.max(min).min(max)
}

/// Calculate the crop for one target ratio.
///
/// `focal_x` and `focal_y` are percentages (0–100); values outside that
/// range are tolerated and end up clamped with the rectangle.
pub fn calculate_crop(
    image_width: u32,
    image_height: u32,
    focal_x: f64,
    focal_y: f64,
    target_ratio: f64,
) -> CropRect {
    let (w, h) = (image_width as f64, image_height as f64);
    let image_ratio = w / h;

    let (crop_width, crop_height) = if target_ratio > image_ratio {
        (w, w / target_ratio)
    } else {
        (h * target_ratio, h)
    };

    let focal_px_x = focal_x / 100.0 * w;
    let focal_px_y = focal_y / 100.0 * h;

    // Floating-point error can push crop_width a hair past w
    let crop_x = clamp(
        focal_px_x - crop_width / 2.0,
        0.0,
        (w - crop_width).max(0.0),
    );
    let crop_y = clamp(
        focal_px_y - crop_height / 2.0,
        0.0,
        (h - crop_height).max(0.0),
    );

    let (x, width) = round_axis(crop_x, crop_width, image_width);
    let (y, height) = round_axis(crop_y, crop_height, image_height);
    CropRect {
        x,
        y,
        width,
        height,
    }
}

/// Round one axis to pixels. A side that rounds to zero becomes one pixel
/// wide, pulled back inside the image.
fn round_axis(offset: f64, size: f64, limit: u32) -> (u32, u32) {
    let offset = offset.round() as u32;
    match size.round() as u32 {
        0 => (offset.min(limit.saturating_sub(1)), 1),
        size => (offset, size),
    }
}

/// Calculate crops for every preset.
pub fn calculate_all_crops(
    dimensions: Dimensions,
    focal: FocalPoint,
    presets: &[ResolvedPreset],
) -> CropSet {
    presets
        .iter()
        .map(|preset| {
            let rect = calculate_crop(
                dimensions.width,
                dimensions.height,
                focal.x,
                focal.y,
                preset.numeric_ratio(),
            );
            (preset.name().to_string(), rect)
        })
        .collect()
}
