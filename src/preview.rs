//! Geometry helpers for whatever draws the session.
//!
//! Renderers consume [`SessionEvent::Change`](crate::events::SessionEvent)
//! and need the crop set in display terms: overlay rectangles as percentages
//! of the source, and the `object-position` that makes a fixed-ratio preview
//! frame show exactly the cropped region.

use crate::crop::{CropRect, Dimensions};

/// Crops narrower or shorter than this get a low-resolution warning.
pub const LOW_RES_THRESHOLD: u32 = 1080;

/// Container widths below this switch to the compact layout.
pub const COMPACT_WIDTH: f64 = 768.0;

/// A crop rectangle in percent of the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

pub fn overlay_rect(crop: CropRect, image: Dimensions) -> OverlayRect {
    let (w, h) = (image.width as f64, image.height as f64);
    OverlayRect {
        left: crop.x as f64 / w * 100.0,
        top: crop.y as f64 / h * 100.0,
        width: crop.width as f64 / w * 100.0,
        height: crop.height as f64 / h * 100.0,
    }
}

/// Preview `object-position` in percent for each axis.
///
/// An axis the crop fully spans has nothing to slide along and stays at 50.
pub fn object_position(crop: CropRect, image: Dimensions) -> (f64, f64) {
    fn axis(offset: u32, size: u32, total: u32) -> f64 {
        if total > size {
            offset as f64 / (total - size) as f64 * 100.0
        } else {
            50.0
        }
    }
    (
        axis(crop.x, crop.width, image.width),
        axis(crop.y, crop.height, image.height),
    )
}

/// `object_position` as a CSS value, e.g. `"0.00% 25.00%"`.
pub fn object_position_css(crop: CropRect, image: Dimensions) -> String {
    let (x, y) = object_position(crop, image);
    format!("{x:.2}% {y:.2}%")
}

pub fn is_low_resolution(crop: CropRect) -> bool {
    crop.width < LOW_RES_THRESHOLD || crop.height < LOW_RES_THRESHOLD
}

pub fn dimensions_label(width: u32, height: u32) -> String {
    format!("{width} × {height} px")
}

pub fn is_compact(container_width: f64) -> bool {
    container_width < COMPACT_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: Dimensions = Dimensions {
        width: 4000,
        height: 3000,
    };

    fn rect(x: u32, y: u32, width: u32, height: u32) -> CropRect {
        CropRect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn overlay_is_percent_of_image() {
        let overlay = overlay_rect(rect(0, 375, 4000, 2250), IMAGE);
        assert_eq!(
            overlay,
            OverlayRect {
                left: 0.0,
                top: 12.5,
                width: 100.0,
                height: 75.0
            }
        );
    }

    #[test]
    fn object_position_centered_crop() {
        // 16:9 centered: slides 375 of 750 available rows
        assert_eq!(object_position(rect(0, 375, 4000, 2250), IMAGE), (50.0, 50.0));
    }

    #[test]
    fn object_position_edges() {
        assert_eq!(object_position(rect(0, 0, 3000, 3000), IMAGE), (0.0, 50.0));
        assert_eq!(object_position(rect(1000, 0, 3000, 3000), IMAGE), (100.0, 50.0));
    }

    #[test]
    fn object_position_css_format() {
        assert_eq!(
            object_position_css(rect(250, 0, 3000, 3000), IMAGE),
            "25.00% 50.00%"
        );
    }

    #[test]
    fn low_resolution_threshold() {
        assert!(is_low_resolution(rect(0, 0, 1079, 2000)));
        assert!(is_low_resolution(rect(0, 0, 2000, 1079)));
        assert!(!is_low_resolution(rect(0, 0, 1080, 1080)));
    }

    #[test]
    fn label_format() {
        assert_eq!(dimensions_label(4000, 2250), "4000 × 2250 px");
    }

    #[test]
    fn compact_below_768() {
        assert!(is_compact(767.9));
        assert!(!is_compact(768.0));
    }
}
