//! Session notifications.
//!
//! Every observable state change leaves the session as one [`SessionEvent`]
//! on a plain `std::sync::mpsc` channel. Rendering, export and host code
//! subscribe independently; a subscriber that drops its receiver is pruned on
//! the next emit.

use crate::config::{Layout, Theme};
use crate::crop::{CropSet, Dimensions};
use crate::focal::FocalPoint;
use crate::preset::CropPreset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

/// Stable error codes surfaced to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ImageLoadFailed,
    InvalidRatio,
    InvalidPreset,
    ContainerNotFound,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ImageLoadFailed => "IMAGE_LOAD_FAILED",
            ErrorCode::InvalidRatio => "INVALID_RATIO",
            ErrorCode::InvalidPreset => "INVALID_PRESET",
            ErrorCode::ContainerNotFound => "CONTAINER_NOT_FOUND",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    /// An image finished loading and the session accepts input.
    Ready { dimensions: Dimensions },
    /// The crop set was recomputed.
    Change {
        focal_point: FocalPoint,
        crops: CropSet,
    },
    Error { code: ErrorCode, message: String },
    PresetAdd { preset: CropPreset },
    PresetRemove { name: String },
    LayoutChange { layout: Layout },
    ThemeChange { theme: Theme },
}

/// Fan-out of session events to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SessionEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every sender so receivers observe a closed channel.
    pub fn close(&mut self) {
        self.subscribers.clear();
    }
}
