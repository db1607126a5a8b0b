//! The crop session controller.
//!
//! A [`Session`] owns everything that changes while a user works on one
//! image: the image dimensions, the focal point, the preset registry and the
//! computed crop set. It is the only writer of the crop set. Every mutation
//! that can move a crop triggers a full recompute followed by exactly one
//! [`SessionEvent::Change`].
//!
//! ## Load lifecycle
//!
//! ```text
//! Uninitialized ──set_src──▶ Loading ──ok──▶ Ready
//!                               │ ▲            │
//!                             err └─set_src────┘
//!                               ▼ │
//!                             Failed
//!
//! destroy() from any state ──▶ Destroyed
//! ```
//!
//! Loading is split in two so the probe can run off-thread: [`Session::set_src`]
//! hands out a [`LoadTicket`], the host runs it (inline with
//! [`LoadTicket::run`] or on a helper thread with [`LoadTicket::spawn`]) and
//! passes the [`LoadOutcome`] back to [`Session::complete_load`]. Each ticket
//! carries a generation number; outcomes from anything but the latest ticket
//! are dropped, so a slow probe of an old image can never overwrite a newer
//! one.
//!
//! While not ready there are no dimensions and no crops. Focal-point changes
//! are stored but emit nothing; preset changes still apply and still emit
//! their add/remove events.

use crate::config::{ConfigUpdate, DisplayConfig, Layout, SessionConfig, Theme};
use crate::crop::{CropRect, CropSet, Dimensions, calculate_all_crops};
use crate::events::{ErrorCode, EventBus, SessionEvent};
use crate::focal::{FocalPoint, FocalPointState, Nudge};
use crate::imaging::{
    BackendError, ExportError, ExportResult, ExportedCrop, Exporter, ImageBackend,
};
use crate::preset::{CropPreset, built_in_presets};
use crate::registry::{AddOutcome, PresetRegistry, RemoveOutcome};
use crate::snapshot;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Image failed to load: {src}: {message}")]
    ImageLoadFailed { src: String, message: String },
    #[error("Session has been destroyed")]
    Destroyed,
    #[error("No image loaded")]
    NotReady,
    #[error("Load of {0} was superseded by a newer image")]
    LoadSuperseded(String),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            SessionError::ImageLoadFailed { .. } => Some(ErrorCode::ImageLoadFailed),
            SessionError::Export(err) => err.code(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
    Destroyed,
}

/// Permission to probe one image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    src: String,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// Probe the image on the calling thread.
    pub fn run(self, backend: &impl ImageBackend) -> LoadOutcome {
        let result = backend
            .identify(Path::new(&self.src))
            .and_then(|dims| {
                if dims.is_empty() {
                    Err(BackendError::ProcessingFailed(format!(
                        "image has no pixels ({}x{})",
                        dims.width, dims.height
                    )))
                } else {
                    Ok(dims)
                }
            })
            .map_err(|err| err.to_string());

        LoadOutcome {
            generation: self.generation,
            src: self.src,
            result,
        }
    }

    /// Probe the image on a helper thread.
    pub fn spawn<B>(self, backend: Arc<B>) -> PendingLoad
    where
        B: ImageBackend + Send + 'static,
    {
        let generation = self.generation;
        let src = self.src.clone();
        let handle = thread::spawn(move || self.run(backend.as_ref()));
        PendingLoad {
            generation,
            src,
            handle,
        }
    }
}

/// A probe running on a helper thread.
#[derive(Debug)]
pub struct PendingLoad {
    generation: u64,
    src: String,
    handle: JoinHandle<LoadOutcome>,
}

impl PendingLoad {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the probe finishes. A panicking probe counts as a failed load.
    pub fn wait(self) -> LoadOutcome {
        let PendingLoad {
            generation,
            src,
            handle,
        } = self;
        handle.join().unwrap_or_else(|_| LoadOutcome {
            generation,
            src,
            result: Err("image probe panicked".to_string()),
        })
    }
}

/// Result of probing one image source.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    generation: u64,
    src: String,
    result: Result<Dimensions, String>,
}

impl LoadOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn result(&self) -> &Result<Dimensions, String> {
        &self.result
    }
}

/// What [`Session::complete_load`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCompletion {
    Ready(Dimensions),
    /// A newer `set_src` happened; the outcome was ignored.
    Superseded,
}

pub struct Session {
    state: LoadState,
    generation: u64,
    src: Option<String>,
    dimensions: Option<Dimensions>,
    focal: FocalPointState,
    registry: PresetRegistry,
    crops: CropSet,
    display: DisplayConfig,
    events: EventBus,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl Session {
    /// Start a session with no image.
    ///
    /// Invalid or duplicate presets are skipped with a warning. If none
    /// survive, the built-in presets are used instead.
    pub fn new(config: &SessionConfig) -> Self {
        let mut registry = PresetRegistry::from_presets(&config.presets);
        if registry.is_empty() {
            warn!("no valid presets configured, using built-in presets");
            registry = PresetRegistry::from_presets(&built_in_presets());
        }

        Self {
            state: LoadState::Uninitialized,
            generation: 0,
            src: None,
            dimensions: None,
            focal: FocalPointState::new(config.focal_point),
            registry,
            crops: CropSet::new(),
            display: config.display.clone(),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == LoadState::Destroyed
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Begin loading a new image. Any load still in flight is superseded.
    pub fn set_src(&mut self, src: impl Into<String>) -> Result<LoadTicket, SessionError> {
        if self.is_destroyed() {
            return Err(SessionError::Destroyed);
        }
        let src = src.into();
        self.generation += 1;
        self.state = LoadState::Loading;
        self.src = Some(src.clone());
        self.dimensions = None;
        self.crops.clear();
        debug!(src = %src, generation = self.generation, "loading image");

        Ok(LoadTicket {
            generation: self.generation,
            src,
        })
    }

    /// Apply a probe result.
    ///
    /// Success moves to `Ready`, computes crops and emits `Ready` then
    /// `Change`. Failure moves to `Failed`, emits `Error` and returns
    /// [`SessionError::ImageLoadFailed`]; the session stays usable.
    pub fn complete_load(&mut self, outcome: LoadOutcome) -> Result<LoadCompletion, SessionError> {
        if self.is_destroyed() {
            return Err(SessionError::Destroyed);
        }
        if outcome.generation != self.generation {
            debug!(
                src = %outcome.src,
                stale = outcome.generation,
                current = self.generation,
                "dropping superseded load"
            );
            return Ok(LoadCompletion::Superseded);
        }

        match outcome.result {
            Ok(dimensions) => {
                self.dimensions = Some(dimensions);
                self.state = LoadState::Ready;
                self.recompute();
                info!(
                    src = %outcome.src,
                    width = dimensions.width,
                    height = dimensions.height,
                    "image ready"
                );
                self.events.emit(SessionEvent::Ready { dimensions });
                self.emit_change();
                Ok(LoadCompletion::Ready(dimensions))
            }
            Err(message) => {
                self.dimensions = None;
                self.crops.clear();
                self.state = LoadState::Failed;
                warn!(src = %outcome.src, code = %ErrorCode::ImageLoadFailed, "{message}");
                self.events.emit(SessionEvent::Error {
                    code: ErrorCode::ImageLoadFailed,
                    message: message.clone(),
                });
                Err(SessionError::ImageLoadFailed {
                    src: outcome.src,
                    message,
                })
            }
        }
    }

    /// Load an image and wait for the result.
    pub fn load(
        &mut self,
        src: impl Into<String>,
        backend: &impl ImageBackend,
    ) -> Result<Dimensions, SessionError> {
        let ticket = self.set_src(src)?;
        let src = ticket.src.clone();
        match self.complete_load(ticket.run(backend))? {
            LoadCompletion::Ready(dimensions) => Ok(dimensions),
            LoadCompletion::Superseded => Err(SessionError::LoadSuperseded(src)),
        }
    }

    // =========================================================================
    // Focal point
    // =========================================================================

    pub fn focal_point(&self) -> FocalPoint {
        self.focal.get()
    }

    /// Move the focal point. Emits `Change` whenever the session is ready,
    /// even if the point did not move.
    pub fn set_focal_point(&mut self, point: FocalPoint) -> FocalPoint {
        self.set_focal_point_xy(point.x, point.y)
    }

    pub fn set_focal_point_xy(&mut self, x: f64, y: f64) -> FocalPoint {
        if self.is_destroyed() {
            return self.focal.get();
        }
        let point = self.focal.set(x, y);
        self.recompute();
        self.emit_change();
        point
    }

    pub fn nudge_focal_point(&mut self, direction: Nudge, coarse: bool) -> FocalPoint {
        if self.is_destroyed() {
            return self.focal.get();
        }
        let point = self.focal.nudge(direction, coarse);
        self.recompute();
        self.emit_change();
        point
    }

    // =========================================================================
    // Crops and presets
    // =========================================================================

    pub fn crops(&self) -> CropSet {
        self.crops.clone()
    }

    pub fn crop(&self, name: &str) -> Option<CropRect> {
        self.crops.get(name).copied()
    }

    /// Crops paired with their preset names, in preset order.
    pub fn ordered_crops(&self) -> Vec<(String, CropRect)> {
        self.registry
            .list()
            .iter()
            .filter_map(|p| self.crop(p.name()).map(|rect| (p.name().to_string(), rect)))
            .collect()
    }

    /// Presets with their resolved label and color.
    pub fn presets(&self) -> Vec<CropPreset> {
        self.registry.list().iter().map(|p| p.to_preset()).collect()
    }

    /// Add a preset. Returns `false` for invalid or duplicate presets.
    pub fn add_preset(&mut self, preset: CropPreset) -> bool {
        if self.is_destroyed() {
            return false;
        }
        if self.registry.add(&preset) != AddOutcome::Added {
            return false;
        }
        if let Some(resolved) = self.registry.get(&preset.name) {
            let preset = resolved.to_preset();
            self.events.emit(SessionEvent::PresetAdd { preset });
        }
        self.recompute();
        self.emit_change();
        true
    }

    /// Remove a preset. Refuses to remove the last one.
    pub fn remove_preset(&mut self, name: &str) -> bool {
        if self.is_destroyed() {
            return false;
        }
        if self.registry.remove(name) != RemoveOutcome::Removed {
            return false;
        }
        self.events.emit(SessionEvent::PresetRemove {
            name: name.to_string(),
        });
        self.recompute();
        self.emit_change();
        true
    }

    // =========================================================================
    // Display settings
    // =========================================================================

    pub fn set_layout(&mut self, layout: Layout) {
        if self.is_destroyed() || self.display.layout == layout {
            return;
        }
        self.display.layout = layout;
        self.events.emit(SessionEvent::LayoutChange { layout });
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.is_destroyed() || self.display.theme == theme {
            return;
        }
        self.display.theme = theme;
        self.events.emit(SessionEvent::ThemeChange { theme });
    }

    pub fn set_show_overlay(&mut self, show: bool) {
        if !self.is_destroyed() {
            self.display.show_overlay = show;
        }
    }

    pub fn set_show_dimensions(&mut self, show: bool) {
        if !self.is_destroyed() {
            self.display.show_dimensions = show;
        }
    }

    /// Apply each present field of `update` independently.
    ///
    /// A new `src` starts a load and its ticket is returned; the caller
    /// completes it like any other.
    pub fn update(&mut self, update: ConfigUpdate) -> Result<Option<LoadTicket>, SessionError> {
        if self.is_destroyed() {
            return Err(SessionError::Destroyed);
        }
        let ticket = update.src.map(|src| self.set_src(src)).transpose()?;
        if let Some(point) = update.focal_point {
            self.set_focal_point(point);
        }
        if let Some(layout) = update.layout {
            self.set_layout(layout);
        }
        if let Some(theme) = update.theme {
            self.set_theme(theme);
        }
        if let Some(show) = update.show_overlay {
            self.set_show_overlay(show);
        }
        if let Some(show) = update.show_dimensions {
            self.set_show_dimensions(show);
        }
        Ok(ticket)
    }

    // =========================================================================
    // Export
    // =========================================================================

    fn ready_source(&self) -> Result<(&str, Dimensions), SessionError> {
        if self.is_destroyed() {
            return Err(SessionError::Destroyed);
        }
        match (self.state, self.src.as_deref(), self.dimensions) {
            (LoadState::Ready, Some(src), Some(dims)) => Ok((src, dims)),
            _ => Err(SessionError::NotReady),
        }
    }

    /// Pretty-printed JSON snapshot of the current image, focal point and crops.
    pub fn export_json(&self) -> Result<String, SessionError> {
        let (src, dimensions) = self.ready_source()?;
        let data = snapshot::build(
            src,
            dimensions,
            self.focal.get(),
            self.registry.list(),
            &self.crops,
        );
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Write one preset's crop.
    pub fn export_crop(
        &self,
        backend: &impl ImageBackend,
        exporter: &Exporter,
        name: &str,
    ) -> Result<ExportedCrop, SessionError> {
        let (src, _) = self.ready_source()?;
        let crop = self
            .crop(name)
            .ok_or_else(|| ExportError::UnknownPreset(name.to_string()))?;
        Ok(crate::imaging::export_crop(
            backend,
            exporter,
            Path::new(src),
            name,
            crop,
        )?)
    }

    /// Write every crop, or only those named in `only`, in preset order.
    pub fn export_all(
        &self,
        backend: &impl ImageBackend,
        exporter: &Exporter,
        only: &[String],
    ) -> Result<Vec<ExportResult>, SessionError> {
        let (src, _) = self.ready_source()?;
        let crops = crate::imaging::select_crops(self.ordered_crops(), only)?;
        Ok(crate::imaging::export_all(
            backend,
            exporter,
            Path::new(src),
            &crops,
        ))
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// End the session. Subscribers see their channels close; later
    /// mutations are ignored and in-flight loads are dropped.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.state = LoadState::Destroyed;
        self.generation += 1;
        self.dimensions = None;
        self.crops.clear();
        self.events.close();
        debug!("session destroyed");
    }

    fn recompute(&mut self) {
        match self.dimensions {
            Some(dims) if self.state == LoadState::Ready => {
                self.crops = calculate_all_crops(dims, self.focal.get(), self.registry.list());
            }
            _ => self.crops.clear(),
        }
    }

    fn emit_change(&mut self) {
        if self.state != LoadState::Ready {
            return;
        }
        self.events.emit(SessionEvent::Change {
            focal_point: self.focal.get(),
            crops: self.crops.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::{drain, ready_session};
    use tempfile::TempDir;

    fn change_count(events: &[SessionEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Change { .. }))
            .count()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn new_session_uses_built_ins() {
        let session = Session::default();
        assert_eq!(session.state(), LoadState::Uninitialized);
        assert_eq!(session.presets().len(), 8);
        assert_eq!(session.focal_point(), FocalPoint::CENTER);
        assert!(session.crops().is_empty());
    }

    #[test]
    fn all_invalid_presets_fall_back_to_built_ins() {
        let config = SessionConfig {
            presets: vec![CropPreset::new("bad", "x:y"), CropPreset::new("", "1:1")],
            ..SessionConfig::default()
        };
        let session = Session::new(&config);
        assert_eq!(session.registry().len(), 8);
    }

    #[test]
    fn configured_focal_point_is_initial() {
        let config = SessionConfig {
            focal_point: FocalPoint::new(30.0, 40.0),
            ..SessionConfig::default()
        };
        assert_eq!(
            Session::new(&config).focal_point(),
            FocalPoint { x: 30.0, y: 40.0 }
        );
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_emits_ready_then_change() {
        let mut session = Session::default();
        let rx = session.subscribe();
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(4000, 3000)]);

        let dims = session.load("photo.jpg", &backend).unwrap();
        assert_eq!(dims, Dimensions::new(4000, 3000));
        assert!(session.is_ready());

        let events = drain(&rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SessionEvent::Ready { dimensions: dims });
        match &events[1] {
            SessionEvent::Change { focal_point, crops } => {
                assert_eq!(*focal_point, FocalPoint::CENTER);
                assert_eq!(crops.len(), 8);
                assert_eq!(
                    crops["landscape"],
                    CropRect {
                        x: 0,
                        y: 375,
                        width: 4000,
                        height: 2250
                    }
                );
            }
            other => panic!("expected change, got {other:?}"),
        }
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Identify("photo.jpg".into())]
        );
    }

    #[test]
    fn failed_load_emits_error_and_stays_usable() {
        let mut session = Session::default();
        let rx = session.subscribe();

        let err = session.load("missing.jpg", &MockBackend::new()).unwrap_err();
        assert!(matches!(err, SessionError::ImageLoadFailed { .. }));
        assert_eq!(err.code(), Some(ErrorCode::ImageLoadFailed));
        assert_eq!(session.state(), LoadState::Failed);
        assert!(session.crops().is_empty());

        let events = drain(&rx);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Error {
                code: ErrorCode::ImageLoadFailed,
                ..
            }]
        ));

        // Retry succeeds
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(100, 100)]);
        session.load("ok.jpg", &backend).unwrap();
        assert!(session.is_ready());
        assert_eq!(session.crops().len(), 8);
    }

    #[test]
    fn zero_sized_image_fails_to_load() {
        let mut session = Session::default();
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(0, 10)]);
        assert!(session.load("empty.png", &backend).is_err());
        assert_eq!(session.state(), LoadState::Failed);
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut session = Session::default();
        let rx = session.subscribe();
        let first = MockBackend::with_dimensions(vec![Dimensions::new(1000, 1000)]);
        let second = MockBackend::with_dimensions(vec![Dimensions::new(4000, 3000)]);

        let old = session.set_src("old.jpg").unwrap();
        let new = session.set_src("new.jpg").unwrap();
        assert!(new.generation() > old.generation());

        let new_outcome = new.run(&second);
        let old_outcome = old.run(&first);

        assert_eq!(
            session.complete_load(new_outcome).unwrap(),
            LoadCompletion::Ready(Dimensions::new(4000, 3000))
        );
        assert_eq!(
            session.complete_load(old_outcome).unwrap(),
            LoadCompletion::Superseded
        );

        assert_eq!(session.dimensions(), Some(Dimensions::new(4000, 3000)));
        assert_eq!(session.src(), Some("new.jpg"));
        let readies = drain(&rx)
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::Ready { .. }))
            .count();
        assert_eq!(readies, 1);
    }

    #[test]
    fn spawned_load_completes() {
        let mut session = Session::default();
        let backend = Arc::new(MockBackend::with_dimensions(vec![Dimensions::new(640, 480)]));

        let pending = session.set_src("photo.jpg").unwrap().spawn(backend);
        let outcome = pending.wait();
        assert_eq!(outcome.src(), "photo.jpg");
        assert_eq!(
            session.complete_load(outcome).unwrap(),
            LoadCompletion::Ready(Dimensions::new(640, 480))
        );
    }

    #[test]
    fn set_src_clears_previous_image() {
        let (mut session, _rx) = ready_session(4000, 3000);
        session.set_src("next.jpg").unwrap();
        assert_eq!(session.state(), LoadState::Loading);
        assert!(session.dimensions().is_none());
        assert!(session.crops().is_empty());
    }

    // =========================================================================
    // Focal point
    // =========================================================================

    #[test]
    fn focal_change_emits_one_change() {
        let (mut session, rx) = ready_session(4000, 3000);

        let point = session.set_focal_point_xy(30.0, 40.0);
        assert_eq!(point, FocalPoint { x: 30.0, y: 40.0 });

        let events = drain(&rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            SessionEvent::Change { focal_point, crops } => {
                assert_eq!(*focal_point, point);
                assert_eq!(crops["landscape"].y, 75);
                assert_eq!(crops["landscape"].x, 0);
            }
            other => panic!("expected change, got {other:?}"),
        }
    }

    #[test]
    fn same_focal_point_still_emits() {
        let (mut session, rx) = ready_session(1000, 1000);
        session.set_focal_point(FocalPoint::CENTER);
        session.set_focal_point(FocalPoint::CENTER);
        assert_eq!(change_count(&drain(&rx)), 2);
    }

    #[test]
    fn focal_point_is_clamped() {
        let (mut session, _rx) = ready_session(1000, 1000);
        assert_eq!(
            session.set_focal_point_xy(-10.0, 250.0),
            FocalPoint { x: 0.0, y: 100.0 }
        );
    }

    #[test]
    fn focal_change_before_ready_is_stored_silently() {
        let mut session = Session::default();
        let rx = session.subscribe();

        session.set_focal_point_xy(20.0, 80.0);

        assert!(drain(&rx).is_empty());
        assert_eq!(session.focal_point(), FocalPoint { x: 20.0, y: 80.0 });

        let backend = MockBackend::with_dimensions(vec![Dimensions::new(4000, 3000)]);
        session.load("photo.jpg", &backend).unwrap();
        let expected = crate::crop::calculate_crop(4000, 3000, 20.0, 80.0, 1.0);
        assert_eq!(session.crop("square"), Some(expected));
    }

    #[test]
    fn nudge_moves_and_emits() {
        let (mut session, rx) = ready_session(1000, 1000);
        let point = session.nudge_focal_point(Nudge::Right, true);
        assert_eq!(point.x, 55.0);
        assert_eq!(change_count(&drain(&rx)), 1);
    }

    // =========================================================================
    // Presets
    // =========================================================================

    #[test]
    fn add_preset_emits_add_then_change() {
        let (mut session, rx) = ready_session(4000, 3000);

        assert!(session.add_preset(CropPreset::new("photo", "3:2")));

        let events = drain(&rx);
        assert_eq!(events.len(), 2);
        match &events[0] {
            SessionEvent::PresetAdd { preset } => {
                assert_eq!(preset.name, "photo");
                assert_eq!(preset.label.as_deref(), Some("photo"));
                assert_eq!(preset.color.as_deref(), Some("#A29BFE"));
            }
            other => panic!("expected preset-add, got {other:?}"),
        }
        match &events[1] {
            SessionEvent::Change { crops, .. } => assert!(crops.contains_key("photo")),
            other => panic!("expected change, got {other:?}"),
        }
        assert!(session.crop("photo").is_some());
    }

    #[test]
    fn add_invalid_or_duplicate_preset_is_rejected() {
        let (mut session, rx) = ready_session(4000, 3000);
        assert!(!session.add_preset(CropPreset::new("bad", "abc")));
        assert!(!session.add_preset(CropPreset::new("square", "2:1")));
        assert!(drain(&rx).is_empty());
        assert_eq!(session.presets().len(), 8);
    }

    #[test]
    fn remove_preset_drops_crop() {
        let (mut session, rx) = ready_session(4000, 3000);

        assert!(session.remove_preset("banner"));
        assert!(session.crop("banner").is_none());

        let events = drain(&rx);
        assert_eq!(
            events[0],
            SessionEvent::PresetRemove {
                name: "banner".into()
            }
        );
        assert_eq!(change_count(&events), 1);

        let names: Vec<String> = session.crops().into_keys().collect();
        let mut registry_names: Vec<String> = session
            .registry()
            .names()
            .into_iter()
            .map(String::from)
            .collect();
        registry_names.sort();
        assert_eq!(names, registry_names);
    }

    #[test]
    fn remove_last_preset_is_refused() {
        let config = SessionConfig {
            presets: vec![CropPreset::new("only", "1:1")],
            ..SessionConfig::default()
        };
        let mut session = Session::new(&config);
        let rx = session.subscribe();
        assert!(!session.remove_preset("only"));
        assert!(!session.remove_preset("missing"));
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn preset_changes_before_ready_emit_only_preset_events() {
        let mut session = Session::default();
        let rx = session.subscribe();
        assert!(session.add_preset(CropPreset::new("extra", 2.0)));
        assert!(session.remove_preset("extra"));
        let events = drain(&rx);
        assert_eq!(events.len(), 2);
        assert_eq!(change_count(&events), 0);
    }

    #[test]
    fn presets_report_resolved_fields() {
        let session = Session::default();
        let presets = session.presets();
        assert_eq!(presets[0].name, "landscape");
        assert_eq!(presets[0].label.as_deref(), Some("Landscape 16:9"));
        assert_eq!(presets[0].color.as_deref(), Some("#FF6B6B"));
    }

    #[test]
    fn ordered_crops_follow_registry() {
        let (session, _rx) = ready_session(4000, 3000);
        let names: Vec<String> = session.ordered_crops().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names[0], "landscape");
        assert_eq!(names[7], "banner");
    }

    // =========================================================================
    // Display and update
    // =========================================================================

    #[test]
    fn layout_and_theme_emit_on_change_only() {
        let (mut session, rx) = ready_session(100, 100);
        session.set_layout(Layout::Single);
        session.set_layout(Layout::Single);
        session.set_theme(Theme::Dark);

        assert_eq!(
            drain(&rx),
            vec![
                SessionEvent::LayoutChange {
                    layout: Layout::Single
                },
                SessionEvent::ThemeChange { theme: Theme::Dark },
            ]
        );
        assert_eq!(session.display().layout, Layout::Single);
    }

    #[test]
    fn update_applies_each_field() {
        let (mut session, rx) = ready_session(4000, 3000);

        let ticket = session
            .update(ConfigUpdate {
                focal_point: Some(FocalPoint::new(10.0, 10.0)),
                theme: Some(Theme::Dark),
                show_overlay: Some(false),
                show_dimensions: Some(false),
                ..ConfigUpdate::default()
            })
            .unwrap();

        assert!(ticket.is_none());
        assert_eq!(session.focal_point(), FocalPoint { x: 10.0, y: 10.0 });
        assert!(!session.display().show_overlay);
        assert!(!session.display().show_dimensions);
        let events = drain(&rx);
        assert_eq!(change_count(&events), 1);
        assert!(events.contains(&SessionEvent::ThemeChange { theme: Theme::Dark }));
    }

    #[test]
    fn update_with_src_returns_ticket() {
        let (mut session, _rx) = ready_session(100, 100);
        let ticket = session
            .update(ConfigUpdate {
                src: Some("other.jpg".into()),
                ..ConfigUpdate::default()
            })
            .unwrap()
            .unwrap();
        assert_eq!(ticket.src(), "other.jpg");
        assert_eq!(session.state(), LoadState::Loading);

        let backend = MockBackend::with_dimensions(vec![Dimensions::new(300, 200)]);
        session.complete_load(ticket.run(&backend)).unwrap();
        assert_eq!(session.dimensions(), Some(Dimensions::new(300, 200)));
    }

    // =========================================================================
    // Export
    // =========================================================================

    #[test]
    fn export_json_requires_ready() {
        let session = Session::default();
        assert!(matches!(session.export_json(), Err(SessionError::NotReady)));
    }

    #[test]
    fn export_json_shape() {
        let (mut session, _rx) = ready_session(4000, 3000);
        session.set_focal_point_xy(30.0, 40.0);

        let json: serde_json::Value = serde_json::from_str(&session.export_json().unwrap()).unwrap();
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["focalPoint"]["x"], 30.0);
        assert_eq!(json["image"]["src"], "photo.jpg");
        assert_eq!(json["image"]["height"], 3000);
        assert_eq!(json["crops"]["landscape"]["y"], 75);
        assert_eq!(json["crops"]["landscape"]["preset"]["name"], "landscape");
        assert_eq!(json["crops"].as_object().unwrap().len(), 8);
    }

    #[test]
    fn export_all_uses_registry_order() {
        let (session, _rx) = ready_session(4000, 3000);
        let tmp = TempDir::new().unwrap();
        let exporter = Exporter::new(tmp.path()).unwrap();
        let backend = MockBackend::new();

        let results = session.export_all(&backend, &exporter, &[]).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.preset.as_str()).collect();
        assert_eq!(names, session.registry().names());
    }

    #[test]
    fn export_crop_unknown_preset() {
        let (session, _rx) = ready_session(4000, 3000);
        let tmp = TempDir::new().unwrap();
        let exporter = Exporter::new(tmp.path()).unwrap();

        let err = session
            .export_crop(&MockBackend::new(), &exporter, "nope")
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Export(ExportError::UnknownPreset(_))
        ));
    }

    #[test]
    fn export_crop_passes_current_rect() {
        let (session, _rx) = ready_session(4000, 3000);
        let tmp = TempDir::new().unwrap();
        let exporter = Exporter::new(tmp.path()).unwrap();
        let backend = MockBackend::new();

        let exported = session.export_crop(&backend, &exporter, "square").unwrap();
        assert_eq!(Some(exported.crop), session.crop("square"));
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::ExportCrop { source, .. } if source == "photo.jpg"
        ));
    }

    // =========================================================================
    // Destroy
    // =========================================================================

    #[test]
    fn destroy_closes_subscribers_and_ignores_mutations() {
        let (mut session, rx) = ready_session(4000, 3000);
        session.destroy();

        assert!(session.is_destroyed());
        assert!(matches!(
            rx.try_recv(),
            Err(std::sync::mpsc::TryRecvError::Disconnected)
        ));

        let before = session.focal_point();
        assert_eq!(session.set_focal_point_xy(10.0, 10.0), before);
        assert!(!session.add_preset(CropPreset::new("x", "1:1")));
        assert!(!session.remove_preset("square"));
        assert!(matches!(session.set_src("a.jpg"), Err(SessionError::Destroyed)));
        assert!(matches!(session.export_json(), Err(SessionError::Destroyed)));
    }

    #[test]
    fn load_in_flight_at_destroy_is_dropped() {
        let mut session = Session::default();
        let ticket = session.set_src("photo.jpg").unwrap();
        session.destroy();

        let backend = MockBackend::with_dimensions(vec![Dimensions::new(10, 10)]);
        assert!(matches!(
            session.complete_load(ticket.run(&backend)),
            Err(SessionError::Destroyed)
        ));
        assert!(session.dimensions().is_none());
    }
}
