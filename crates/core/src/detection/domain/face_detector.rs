use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for face detection.
///
/// Implementations may be stateful, hence `&mut self`. A successful call
/// always yields a detection set, possibly empty; per-frame inference
/// failure is not part of the contract once a backend has initialised.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
