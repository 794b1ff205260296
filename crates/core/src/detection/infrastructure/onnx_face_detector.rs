/// Learned face detector using ONNX Runtime via `ort`.
///
/// Runs an UltraFace-style SSD model: the frame is resized to the model's
/// fixed input resolution, inference yields per-candidate confidence
/// scores and normalised corner boxes, weak candidates are discarded and
/// the survivors clamped to frame bounds.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::MIN_DETECTION_CONFIDENCE;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Fallback input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_WIDTH: u32 = 320;
const DEFAULT_INPUT_HEIGHT: u32 = 240;

/// UltraFace pixel normalisation: `(value - 127) / 128`.
const PIXEL_MEAN: f32 = 127.0;
const PIXEL_SCALE: f32 = 128.0;

pub struct OnnxFaceDetector {
    session: ort::session::Session,
    min_confidence: f64,
    input_width: u32,
    input_height: u32,
}

impl OnnxFaceDetector {
    /// Loads the model and prepares for inference.
    ///
    /// The input resolution is read from the model's input shape
    /// (expecting NCHW `[1, 3, H, W]`), falling back to 320×240 when the
    /// shape is dynamic or unreadable. Failure here is a startup-time
    /// condition handled by the detector factory, not a per-frame error.
    pub fn new(model_path: &Path, min_confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        let (input_width, input_height) = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 && shape[3] > 0 {
                        Some((shape[3] as u32, shape[2] as u32))
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or((DEFAULT_INPUT_WIDTH, DEFAULT_INPUT_HEIGHT));

        Ok(Self {
            session,
            min_confidence,
            input_width,
            input_height,
        })
    }

    pub fn with_default_confidence(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::new(model_path, MIN_DETECTION_CONFIDENCE)
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let input_tensor = preprocess(frame, self.input_width, self.input_height);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() < 2 {
            return Err("face model produced fewer than two outputs".into());
        }

        // Output order is (scores [1,N,2], boxes [1,N,4]); disambiguate
        // by the trailing dimension in case the model swaps them.
        let first = outputs[0].try_extract_array::<f32>()?;
        let second = outputs[1].try_extract_array::<f32>()?;
        let (scores_arr, boxes_arr) = if first.shape().last() == Some(&2) {
            (first, second)
        } else {
            (second, first)
        };

        let num = scores_arr.shape().get(1).copied().unwrap_or(0);
        let scores = scores_arr.as_slice().ok_or("cannot view scores tensor")?;
        let boxes = boxes_arr.as_slice().ok_or("cannot view boxes tensor")?;

        Ok(parse_detections(
            scores,
            boxes,
            num,
            frame.width(),
            frame.height(),
            self.min_confidence,
        ))
    }
}

/// Resizes (nearest-neighbor) and normalises a frame into an NCHW
/// float32 tensor of shape `[1, 3, in_h, in_w]`.
fn preprocess(frame: &Frame, in_w: u32, in_h: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_w = frame.width() as usize;
    let src_h = frame.height() as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, in_h as usize, in_w as usize));
    for y in 0..in_h as usize {
        let src_y = (y * src_h / in_h as usize).min(src_h - 1);
        for x in 0..in_w as usize {
            let src_x = (x * src_w / in_w as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - PIXEL_MEAN) / PIXEL_SCALE;
            }
        }
    }
    tensor
}

/// Turns raw SSD outputs into a filtered, clamped detection set.
///
/// `scores` is `N × 2` (background, face) and `boxes` is `N × 4`
/// normalised `[x1, y1, x2, y2]`. Candidates below `min_confidence` are
/// discarded; surviving boxes are scaled to frame pixels and clamped so
/// they never go negative or exceed the frame.
fn parse_detections(
    scores: &[f32],
    boxes: &[f32],
    num: usize,
    frame_w: u32,
    frame_h: u32,
    min_confidence: f64,
) -> Vec<Detection> {
    let mut detections = Vec::new();
    for i in 0..num {
        let Some(&score) = scores.get(i * 2 + 1) else {
            break;
        };
        let confidence = score as f64;
        if confidence < min_confidence {
            continue;
        }
        let Some(b) = boxes.get(i * 4..i * 4 + 4) else {
            break;
        };
        let x1 = (b[0] as f64 * frame_w as f64).round() as i32;
        let y1 = (b[1] as f64 * frame_h as f64).round() as i32;
        let x2 = (b[2] as f64 * frame_w as f64).round() as i32;
        let y2 = (b[3] as f64 * frame_h as f64).round() as i32;

        let detection = Detection::new(x1, y1, x2 - x1, y2 - y1, confidence);
        detections.push(detection.clamped(frame_w, frame_h));
    }
    detections
}
