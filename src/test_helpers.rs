//! Shared test utilities.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let (mut session, rx) = ready_session(4000, 3000);
//! session.set_focal_point_xy(30.0, 40.0);
//! assert_eq!(drain(&rx).len(), 1);
//! ```

use std::path::Path;
use std::sync::mpsc::Receiver;

use crate::crop::Dimensions;
use crate::events::SessionEvent;
use crate::imaging::backend::tests::MockBackend;
use crate::session::Session;
use image::{ImageEncoder, RgbImage};

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a small valid JPEG with a gradient so crops are distinguishable.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

// =========================================================================
// Sessions
// =========================================================================

/// A default session with `photo.jpg` loaded at the given size.
///
/// The `Ready` and initial `Change` events are already drained.
pub fn ready_session(width: u32, height: u32) -> (Session, Receiver<SessionEvent>) {
    let mut session = Session::default();
    let rx = session.subscribe();
    let backend = MockBackend::with_dimensions(vec![Dimensions::new(width, height)]);
    session.load("photo.jpg", &backend).unwrap();
    drain(&rx);
    (session, rx)
}

/// Everything currently queued on a subscription.
pub fn drain(rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
    rx.try_iter().collect()
}
