pub const FACE_MODEL_NAME: &str = "version-RFB-320.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/ultraface/models/version-RFB-320.onnx";

/// Minimum confidence for learned-model detections.
pub const MIN_DETECTION_CONFIDENCE: f64 = 0.7;

/// Fixed confidence assigned to frontal cascade candidates.
pub const FRONTAL_CONFIDENCE: f64 = 1.0;
/// Fixed confidence assigned to profile cascade candidates (lower trust).
pub const PROFILE_CONFIDENCE: f64 = 0.9;

/// Plausible face width/height aspect ratio band for cascade candidates.
pub const MIN_FACE_ASPECT: f64 = 0.5;
pub const MAX_FACE_ASPECT: f64 = 1.5;

/// Frames wider than this are downscaled before streaming.
pub const MAX_STREAM_WIDTH: u32 = 640;

/// JPEG quality factor for streamed frames (clarity/size balance).
pub const STREAM_JPEG_QUALITY: u8 = 90;

/// Minimum spacing between two detection notifications while
/// detection persists, in seconds.
pub const NOTIFICATION_COOLDOWN_SECS: f64 = 5.0;

/// Padding added on every side of a captured face crop, in pixels.
pub const CAPTURE_PADDING: i32 = 20;

/// Throttle intervals per quality level, in seconds.
pub const LOW_QUALITY_INTERVAL_SECS: f64 = 0.40;
pub const MEDIUM_QUALITY_INTERVAL_SECS: f64 = 0.25;
pub const HIGH_QUALITY_INTERVAL_SECS: f64 = 0.18;
