//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every preset leads with its positional index and label. Pixel geometry,
//! file paths and warnings follow as indented context lines, so the output
//! reads as an inventory of crops while still showing where each one lands.
//!
//! # Output Format
//!
//! ## Crops
//!
//! ```text
//! photo.jpg (4000 × 3000 px)
//! Focal point: 30.0%, 40.0%
//! 001 Landscape 16:9
//!     Crop: 4000 × 2250 px at 0, 75
//! 002 Square 1:1
//!     Crop: 3000 × 3000 px at 0, 0
//! ```
//!
//! ## Presets
//!
//! ```text
//! 001 Landscape 16:9 [landscape]
//!     Ratio: 16:9 (1.778)
//!     Color: #FF6B6B
//! ```
//!
//! ## Export
//!
//! ```text
//! 001 landscape → out/landscape.png
//! 002 square: failed
//!     Error: Processing failed: ...
//!
//! Exported 1 of 2 crops
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::crop::{CropRect, Dimensions};
use crate::events::SessionEvent;
use crate::focal::FocalPoint;
use crate::imaging::ExportResult;
use crate::preset::ResolvedPreset;
use crate::preview::{dimensions_label, is_low_resolution};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `Crop: W × H px at X, Y`
fn crop_line(crop: &CropRect) -> String {
    format!(
        "Crop: {} at {}, {}",
        dimensions_label(crop.width, crop.height),
        crop.x,
        crop.y
    )
}

// ============================================================================
// Crops
// ============================================================================

/// Format the crop set for one image, in preset order.
pub fn format_crops(
    src: &str,
    dimensions: Dimensions,
    focal: FocalPoint,
    presets: &[ResolvedPreset],
    crops: &[(String, CropRect)],
) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} ({})",
            src,
            dimensions_label(dimensions.width, dimensions.height)
        ),
        format!("Focal point: {:.1}%, {:.1}%", focal.x, focal.y),
    ];

    for (i, (name, crop)) in crops.iter().enumerate() {
        let label = presets
            .iter()
            .find(|p| p.name() == name)
            .map(ResolvedPreset::label)
            .unwrap_or(name.as_str());
        lines.push(format!("{} {}", format_index(i + 1), label));
        lines.push(format!("{}{}", indent(1), crop_line(crop)));
        if is_low_resolution(*crop) {
            lines.push(format!("{}Warning: low resolution", indent(1)));
        }
    }
    lines
}

pub fn print_crops(
    src: &str,
    dimensions: Dimensions,
    focal: FocalPoint,
    presets: &[ResolvedPreset],
    crops: &[(String, CropRect)],
) {
    for line in format_crops(src, dimensions, focal, presets, crops) {
        println!("{}", line);
    }
}

// ============================================================================
// Presets
// ============================================================================

pub fn format_presets(presets: &[ResolvedPreset]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, preset) in presets.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}]",
            format_index(i + 1),
            preset.label(),
            preset.name()
        ));
        lines.push(format!(
            "{}Ratio: {} ({:.3})",
            indent(1),
            preset.ratio(),
            preset.numeric_ratio()
        ));
        lines.push(format!("{}Color: {}", indent(1), preset.color()));
    }
    lines
}

pub fn print_presets(presets: &[ResolvedPreset]) {
    for line in format_presets(presets) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

/// Format batch export results, one entry per preset plus a summary.
pub fn format_export_results(results: &[ExportResult]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, result) in results.iter().enumerate() {
        match &result.outcome {
            Ok(exported) => lines.push(format!(
                "{} {} \u{2192} {}",
                format_index(i + 1),
                result.preset,
                exported.path.display()
            )),
            Err(err) => {
                lines.push(format!("{} {}: failed", format_index(i + 1), result.preset));
                lines.push(format!("{}Error: {}", indent(1), err));
            }
        }
    }
    let written = results.iter().filter(|r| r.outcome.is_ok()).count();
    lines.push(String::new());
    lines.push(format!("Exported {} of {} crops", written, results.len()));
    lines
}

pub fn print_export_results(results: &[ExportResult]) {
    for line in format_export_results(results) {
        println!("{}", line);
    }
}

// ============================================================================
// Session events
// ============================================================================

/// One-line summary of a session event, for verbose CLI runs.
pub fn format_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Ready { dimensions } => format!(
            "ready: {}",
            dimensions_label(dimensions.width, dimensions.height)
        ),
        SessionEvent::Change { focal_point, crops } => format!(
            "change: focal {:.1}%, {:.1}% ({} crops)",
            focal_point.x,
            focal_point.y,
            crops.len()
        ),
        SessionEvent::Error { code, message } => format!("error: {code}: {message}"),
        SessionEvent::PresetAdd { preset } => format!("preset-add: {}", preset.name),
        SessionEvent::PresetRemove { name } => format!("preset-remove: {name}"),
        SessionEvent::LayoutChange { layout } => format!("layout-change: {layout}"),
        SessionEvent::ThemeChange { theme } => format!("theme-change: {theme}"),
    }
}
