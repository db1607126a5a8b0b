//! Ordered, name-keyed collection of resolved presets.
//!
//! Two invariants hold after every operation:
//!
//! - names are unique
//! - at least one preset remains once the registry has been populated
//!
//! Rejections are non-fatal: an invalid or duplicate preset is logged and the
//! registry is left untouched.

use crate::preset::{CropPreset, PresetError, ResolvedPreset, resolve_preset, validate_preset};
use tracing::warn;

/// Result of [`PresetRegistry::add`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added,
    /// A preset with this name already exists.
    Duplicate,
    Rejected(PresetError),
}

/// Result of [`PresetRegistry::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// Refused: the registry must keep at least one preset.
    LastPreset,
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetRegistry {
    presets: Vec<ResolvedPreset>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from caller-supplied presets, skipping invalid and duplicate
    /// entries. Default colors are assigned by position in `presets`, so a
    /// skipped entry still consumes its palette slot.
    pub fn from_presets<'a>(presets: impl IntoIterator<Item = &'a CropPreset>) -> Self {
        let mut registry = Self::new();
        for (index, preset) in presets.into_iter().enumerate() {
            match resolve_preset(preset, index) {
                Ok(resolved) if registry.contains(resolved.name()) => {
                    warn!(preset = %preset.name, "duplicate preset name, skipping");
                }
                Ok(resolved) => registry.presets.push(resolved),
                Err(err) => warn!(code = %err.code(), "{err}. Skipping."),
            }
        }
        registry
    }

    /// Validate, resolve at the next index, and append.
    pub fn add(&mut self, preset: &CropPreset) -> AddOutcome {
        if let Err(err) = validate_preset(preset) {
            warn!(code = %err.code(), "{err}");
            return AddOutcome::Rejected(err);
        }
        if self.contains(&preset.name) {
            warn!(preset = %preset.name, "preset name already exists, ignoring duplicate");
            return AddOutcome::Duplicate;
        }
        match resolve_preset(preset, self.presets.len()) {
            Ok(resolved) => {
                self.presets.push(resolved);
                AddOutcome::Added
            }
            Err(err) => AddOutcome::Rejected(err),
        }
    }

    pub fn remove(&mut self, name: &str) -> RemoveOutcome {
        if self.presets.len() <= 1 {
            warn!("cannot remove the last preset, at least one is required");
            return RemoveOutcome::LastPreset;
        }
        match self.presets.iter().position(|p| p.name() == name) {
            Some(index) => {
                self.presets.remove(index);
                RemoveOutcome::Removed
            }
            None => RemoveOutcome::NotFound,
        }
    }

    /// All presets in insertion order.
    pub fn list(&self) -> &[ResolvedPreset] {
        &self.presets
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedPreset> {
        self.presets.iter().find(|p| p.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(ResolvedPreset::name).collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
