use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;

use super::cascade_face_detector::CascadeFaceDetector;
use super::onnx_face_detector::OnnxFaceDetector;

/// Creates the best available detector, preferring the learned model.
///
/// The two strategies are mutually exclusive and resolved exactly once
/// here: if the model artifact is missing or fails to load, the cascade
/// strategy takes over. Startup degradation is logged, never fatal, and
/// there is no runtime switching afterwards.
pub fn create_detector(model_path: Option<&Path>, min_confidence: f64) -> Box<dyn FaceDetector> {
    if let Some(path) = model_path {
        match OnnxFaceDetector::new(path, min_confidence) {
            Ok(detector) => {
                log::info!("Using learned face detector ({})", path.display());
                return Box::new(detector);
            }
            Err(e) => {
                log::warn!(
                    "Learned face detector unavailable ({e}), falling back to cascade strategy"
                );
            }
        }
    } else {
        log::info!("No model artifact configured, using cascade face detector");
    }
    Box::new(CascadeFaceDetector::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::Frame;
    use std::io::Write;

    #[test]
    fn test_missing_model_falls_back_to_cascade() {
        let mut detector = create_detector(Some(Path::new("/nonexistent/model.onnx")), 0.7);
        // Fallback detector must still produce a (possibly empty) set
        let frame = Frame::new(vec![0; 30 * 30 * 3], 30, 30, 3, 0);
        assert!(detector.detect(&frame).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_model_falls_back_to_cascade() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"not an onnx model").unwrap();

        let mut detector = create_detector(Some(&path), 0.7);
        let frame = Frame::new(vec![0; 30 * 30 * 3], 30, 30, 3, 0);
        assert!(detector.detect(&frame).unwrap().is_empty());
    }

    #[test]
    fn test_no_model_configured_uses_cascade() {
        let mut detector = create_detector(None, 0.7);
        let frame = Frame::new(vec![0; 30 * 30 * 3], 30, 30, 3, 0);
        assert!(detector.detect(&frame).unwrap().is_empty());
    }
}
