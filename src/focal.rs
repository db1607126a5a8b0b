//! Focal point state and the input helpers that feed it.
//!
//! Coordinates are percentages of the image (0–100 per axis), quantized to
//! one decimal place. Every mutation goes through the same clamp + quantize
//! step, so setting the same point twice stores the same value.

use serde::{Deserialize, Serialize};

/// Keyboard step in percent; the coarse step applies with a modifier held.
pub const FINE_STEP: f64 = 1.0;
pub const COARSE_STEP: f64 = 5.0;

fn quantize(value: f64) -> f64 {
    (value.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

/// NaN keeps `fallback`; infinities clamp to the nearest bound.
fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        quantize(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FocalPoint {
    pub x: f64,
    pub y: f64,
}

impl FocalPoint {
    pub const CENTER: FocalPoint = FocalPoint { x: 50.0, y: 50.0 };

    /// Clamp and quantize. Missing (NaN) axes fall back to the center.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: sanitize(x, Self::CENTER.x),
            y: sanitize(y, Self::CENTER.y),
        }
    }

    /// Map a pointer position inside the displayed image to a focal point.
    ///
    /// `px`/`py` are relative to the image's top-left corner in display
    /// units. Positions outside the image clamp to its edges. Returns `None`
    /// for a zero-sized display area.
    pub fn from_pointer(px: f64, py: f64, display_width: f64, display_height: f64) -> Option<Self> {
        if !(display_width > 0.0 && display_height > 0.0) {
            return None;
        }
        Some(Self::new(
            px / display_width * 100.0,
            py / display_height * 100.0,
        ))
    }

    pub fn is_within_bounds(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

impl Default for FocalPoint {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Arrow-key direction for keyboard nudging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Left,
    Right,
    Up,
    Down,
}

/// Holds the session's current focal point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FocalPointState {
    point: FocalPoint,
}

impl FocalPointState {
    pub fn new(initial: FocalPoint) -> Self {
        Self {
            point: FocalPoint::new(initial.x, initial.y),
        }
    }

    pub fn get(&self) -> FocalPoint {
        self.point
    }

    /// Store a clamped, quantized point. A NaN axis keeps its current value.
    pub fn set(&mut self, x: f64, y: f64) -> FocalPoint {
        self.point = FocalPoint {
            x: sanitize(x, self.point.x),
            y: sanitize(y, self.point.y),
        };
        self.point
    }

    pub fn nudge(&mut self, direction: Nudge, coarse: bool) -> FocalPoint {
        let step = if coarse { COARSE_STEP } else { FINE_STEP };
        let FocalPoint { x, y } = self.point;
        match direction {
            Nudge::Left => self.set(x - step, y),
            Nudge::Right => self.set(x + step, y),
            Nudge::Up => self.set(x, y - step),
            Nudge::Down => self.set(x, y + step),
        }
    }
}

/// Collapses a burst of drag updates into one point per display refresh.
///
/// Input handlers call [`push`](Self::push) for every pointer move; the
/// frame callback calls [`take`](Self::take) once and recomputes only if a
/// point was pending.
#[derive(Debug, Clone, Default)]
pub struct DragCoalescer {
    pending: Option<FocalPoint>,
}

impl DragCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: FocalPoint) {
        self.pending = Some(point);
    }

    pub fn take(&mut self) -> Option<FocalPoint> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
