//! Versioned JSON snapshot of a session.
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "focalPoint": { "x": 50.0, "y": 50.0 },
//!   "image": { "src": "photo.jpg", "width": 4000, "height": 3000 },
//!   "crops": {
//!     "landscape": {
//!       "x": 0, "y": 375, "width": 4000, "height": 2250,
//!       "preset": { "name": "landscape", "ratio": "16:9", "label": "Landscape 16:9" }
//!     }
//!   }
//! }
//! ```
//!
//! Crops appear in preset order, not alphabetically.

use crate::crop::{CropRect, CropSet, Dimensions};
use crate::focal::FocalPoint;
use crate::preset::ResolvedPreset;
use crate::ratio::RatioSpec;
use serde::{Serialize, Serializer};

pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData<'a> {
    pub version: &'static str,
    pub focal_point: FocalPoint,
    pub image: ImageInfo<'a>,
    pub crops: OrderedCrops<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo<'a> {
    pub src: &'a str,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropEntry<'a> {
    #[serde(flatten)]
    pub rect: CropRect,
    pub preset: PresetInfo<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetInfo<'a> {
    pub name: &'a str,
    pub ratio: &'a RatioSpec,
    pub label: &'a str,
}

/// Crop entries kept in preset order and written as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedCrops<'a>(pub Vec<CropEntry<'a>>);

impl Serialize for OrderedCrops<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|entry| (entry.preset.name, entry)))
    }
}

/// Assemble a snapshot. Presets without a computed crop are left out.
pub fn build<'a>(
    src: &'a str,
    dimensions: Dimensions,
    focal_point: FocalPoint,
    presets: &'a [ResolvedPreset],
    crops: &CropSet,
) -> ExportData<'a> {
    let entries = presets
        .iter()
        .filter_map(|preset| {
            crops.get(preset.name()).map(|rect| CropEntry {
                rect: *rect,
                preset: PresetInfo {
                    name: preset.name(),
                    ratio: preset.ratio(),
                    label: preset.label(),
                },
            })
        })
        .collect();

    ExportData {
        version: SNAPSHOT_VERSION,
        focal_point,
        image: ImageInfo {
            src,
            width: dimensions.width,
            height: dimensions.height,
        },
        crops: OrderedCrops(entries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::calculate_all_crops;
    use crate::preset::{CropPreset, resolve_preset};

    fn presets() -> Vec<ResolvedPreset> {
        [
            CropPreset::new("wide", "16:9").with_label("Wide"),
            CropPreset::new("box", 1.0),
        ]
        .iter()
        .enumerate()
        .map(|(i, p)| resolve_preset(p, i).unwrap())
        .collect()
    }

    #[test]
    fn snapshot_shape() {
        let presets = presets();
        let dims = Dimensions::new(4000, 3000);
        let crops = calculate_all_crops(dims, FocalPoint::CENTER, &presets);
        let data = build("photo.jpg", dims, FocalPoint::CENTER, &presets, &crops);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["focalPoint"]["x"], 50.0);
        assert_eq!(json["image"]["src"], "photo.jpg");
        assert_eq!(json["image"]["width"], 4000);
        assert_eq!(json["crops"]["wide"]["y"], 375);
        assert_eq!(json["crops"]["wide"]["preset"]["ratio"], "16:9");
        assert_eq!(json["crops"]["wide"]["preset"]["label"], "Wide");
        assert_eq!(json["crops"]["box"]["preset"]["ratio"], 1.0);
        assert_eq!(json["crops"]["box"]["preset"]["label"], "box");
        assert!(json["crops"]["box"]["preset"].get("color").is_none());
    }

    #[test]
    fn crops_follow_preset_order() {
        let presets: Vec<ResolvedPreset> = ["zeta", "alpha", "mid"]
            .iter()
            .enumerate()
            .map(|(i, n)| resolve_preset(&CropPreset::new(*n, "1:1"), i).unwrap())
            .collect();
        let dims = Dimensions::new(100, 100);
        let crops = calculate_all_crops(dims, FocalPoint::CENTER, &presets);

        let text = serde_json::to_string(&build("a.png", dims, FocalPoint::CENTER, &presets, &crops))
            .unwrap();
        let zeta = text.find("\"zeta\"").unwrap();
        let alpha = text.find("\"alpha\"").unwrap();
        let mid = text.find("\"mid\"").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn presets_without_crop_are_skipped() {
        let presets = presets();
        let data = build(
            "a.png",
            Dimensions::new(10, 10),
            FocalPoint::CENTER,
            &presets,
            &CropSet::new(),
        );
        assert!(data.crops.0.is_empty());
    }
}
