use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::capture::capture_request::CaptureRequest;
use crate::shared::constants::CAPTURE_PADDING;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;
use crate::shared::snapshot::{FrameSnapshot, SnapshotStore};
use crate::video::domain::image_writer::ImageWriter;

/// Persists the current frame and/or individual face crops on demand.
///
/// Operates on the latest snapshot, read atomically with respect to the
/// producer loop — if the pipeline has already advanced, the newest
/// available frame/detection pair is what gets captured. Artifact
/// success is per-file: one failed write is logged and the rest are
/// still attempted.
///
/// Filenames embed a second-granularity timestamp; two captures within
/// the same second can collide, which is an accepted limitation.
pub struct CaptureFacesUseCase {
    snapshots: Arc<SnapshotStore>,
    writer: Box<dyn ImageWriter>,
    output_dir: PathBuf,
}

impl CaptureFacesUseCase {
    pub fn new(
        snapshots: Arc<SnapshotStore>,
        writer: Box<dyn ImageWriter>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            snapshots,
            writer,
            output_dir,
        }
    }

    /// Handles one capture trigger, returning the paths of the artifacts
    /// actually written. With no snapshot yet (pipeline not started or
    /// no frame processed), the request is a no-op.
    pub fn execute(&self, request: CaptureRequest) -> Vec<PathBuf> {
        let Some(snapshot) = self.snapshots.latest() else {
            log::warn!("Capture requested before any frame was processed");
            return Vec::new();
        };
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();

        match request {
            CaptureRequest::All => self.capture_all(&snapshot, &stamp),
            CaptureRequest::Face(n) => self.capture_face(&snapshot, n, &stamp),
        }
    }

    fn capture_all(&self, snapshot: &FrameSnapshot, stamp: &str) -> Vec<PathBuf> {
        let mut written = Vec::new();

        let full_path = self.output_dir.join(format!("full_capture_{stamp}.jpg"));
        if self.write_artifact(&full_path, &snapshot.frame) {
            written.push(full_path);
        }

        for (i, face) in snapshot.faces.iter().enumerate() {
            if let Some(path) = self.write_face_crop(snapshot, face, i + 1, stamp) {
                written.push(path);
            }
        }
        log::info!(
            "Captured {} of {} artifact(s) ({} face(s) detected)",
            written.len(),
            snapshot.faces.len() + 1,
            snapshot.faces.len()
        );
        written
    }

    fn capture_face(&self, snapshot: &FrameSnapshot, index: usize, stamp: &str) -> Vec<PathBuf> {
        // 1-indexed; anything out of range is a no-op by contract
        let Some(face) = index
            .checked_sub(1)
            .and_then(|i| snapshot.faces.get(i))
        else {
            log::warn!(
                "Capture index {index} out of range ({} detection(s) present)",
                snapshot.faces.len()
            );
            return Vec::new();
        };
        self.write_face_crop(snapshot, face, index, stamp)
            .into_iter()
            .collect()
    }

    /// Crops one detection with fixed padding, clamped to frame bounds,
    /// and writes it as `face_{index}_conf_{confidence}_{stamp}.jpg`.
    fn write_face_crop(
        &self,
        snapshot: &FrameSnapshot,
        face: &Detection,
        index: usize,
        stamp: &str,
    ) -> Option<PathBuf> {
        let frame = &snapshot.frame;
        let (x, y, w, h) = face.padded_rect(CAPTURE_PADDING, frame.width(), frame.height());
        if w == 0 || h == 0 {
            log::warn!("Face {index} has an empty crop region, skipping");
            return None;
        }
        let crop = frame.crop(x, y, w, h);
        let path = self.output_dir.join(format!(
            "face_{index}_conf_{:.2}_{stamp}.jpg",
            face.confidence
        ));
        self.write_artifact(&path, &crop).then_some(path)
    }

    fn write_artifact(&self, path: &Path, frame: &Frame) -> bool {
        match self.writer.write(path, frame) {
            Ok(()) => {
                log::info!("Saved {}", path.display());
                true
            }
            Err(e) => {
                log::error!("Failed to save {}: {e}", path.display());
                false
            }
        }
    }
}
