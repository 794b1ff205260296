use std::path::Path;

use crate::shared::frame::Frame;

/// Writes a single frame to an artifact location.
///
/// The store behind this is write-once and keyed by generated names; the
/// core never reads, updates or deletes artifacts.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
