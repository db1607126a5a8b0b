//! # Focal Crop
//!
//! A focal-point driven crop engine. The user marks the most important point
//! of an image once; every preset aspect ratio then gets the largest crop
//! that fits the image while keeping that point as central as the image
//! edges allow.
//!
//! # Architecture: One Writer, One Event Stream
//!
//! ```text
//! input ──▶ FocalPointState / PresetRegistry ──▶ Session recompute ──▶ SessionEvent::Change
//!                                                    │
//!                                 ImageBackend ◀─────┘  (load, export)
//! ```
//!
//! - The crop math is pure ([`crop`], [`ratio`]): no I/O, trivially testable.
//! - [`session::Session`] is the only writer of the crop set. Every mutation
//!   that can move a crop triggers a full recompute and exactly one `Change`.
//! - Collaborators (renderers, exporters, the CLI) subscribe to
//!   [`events::SessionEvent`] and never mutate state directly.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`ratio`] | `"16:9"` / `"16/9"` / `1.91` → positive finite ratio |
//! | [`preset`] | Preset validation, label/color defaults, built-in presets |
//! | [`registry`] | Ordered, uniquely named presets; never drops below one |
//! | [`crop`] | Focal point + ratio → crop rectangle |
//! | [`focal`] | Clamped, quantized focal point; nudging, pointer mapping, drag coalescing |
//! | [`session`] | Load lifecycle, recompute pipeline, notifications, export entry points |
//! | [`events`] | `SessionEvent`, error codes, fan-out event bus |
//! | [`snapshot`] | Versioned JSON snapshot of a session |
//! | [`preview`] | Overlay and preview geometry for renderers |
//! | [`imaging`] | Image probing and crop export: `ImageBackend`, `RustBackend`, batch export |
//! | [`config`] | `focal-crop.toml` loading, merging over stock defaults, validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Percent Focal Points
//!
//! Focal points are stored as percentages of the image, quantized to one
//! decimal place. They survive image replacement and resizing, and the same
//! input always stores the same value.
//!
//! ## Default Colors by Position
//!
//! A preset without a color takes one from a fixed palette by its position
//! in the registry, never by name. Two sessions with the same preset order
//! paint identical overlays.
//!
//! ## Generation-Tagged Loads
//!
//! Image probing runs off the session's thread. Each load gets a ticket with
//! a generation number and only the newest ticket's result is applied, so a
//! slow probe of a replaced image cannot overwrite the current one.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decoding, cropping and
//! encoding. No system libraries are required.

pub mod config;
pub mod crop;
pub mod events;
pub mod focal;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod preset;
pub mod preview;
pub mod ratio;
pub mod registry;
pub mod session;
pub mod snapshot;

pub use crop::{CropRect, CropSet, Dimensions, calculate_all_crops, calculate_crop};
pub use focal::FocalPoint;
pub use preset::{CropPreset, ResolvedPreset};
pub use session::{Session, SessionError};

#[cfg(test)]
pub(crate) mod test_helpers;
