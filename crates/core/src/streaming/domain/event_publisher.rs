use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

use crate::shared::detection::Detection;
use crate::streaming::domain::encoded_frame::EncodedFrame;

/// Periodic frame refresh for connected viewers, sent once per throttle
/// interval.
#[derive(Clone, Debug, Serialize)]
pub struct FrameUpdate {
    /// Compressed image bytes as base64 text.
    pub image: String,
    pub faces: Vec<Detection>,
    pub timestamp: f64,
}

/// Detection alert, sent per debouncer policy. The image is the most
/// recent encoded frame, which may not exist yet on the very first ticks.
#[derive(Clone, Debug, Serialize)]
pub struct FaceDetected {
    pub count: usize,
    pub timestamp: f64,
    pub image: Option<String>,
    pub faces: Vec<Detection>,
}

/// The two message kinds carried by the publish channel.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    FrameUpdate(FrameUpdate),
    FaceDetected(FaceDetected),
}

impl StreamEvent {
    pub fn frame_update(encoded: &EncodedFrame) -> Self {
        StreamEvent::FrameUpdate(FrameUpdate {
            image: BASE64.encode(&encoded.jpeg),
            faces: encoded.faces.clone(),
            timestamp: encoded.timestamp,
        })
    }

    pub fn face_detected(
        count: usize,
        timestamp: f64,
        encoded: Option<&EncodedFrame>,
        faces: &[Detection],
    ) -> Self {
        StreamEvent::FaceDetected(FaceDetected {
            count,
            timestamp,
            image: encoded.map(|e| BASE64.encode(&e.jpeg)),
            faces: faces.to_vec(),
        })
    }
}

/// Outbound broadcast channel toward viewers.
///
/// Best-effort semantics: no backpressure is modelled, and a slow or
/// absent consumer must never block the producer loop. The transport
/// behind this seam is out of scope.
pub trait EventPublisher: Send {
    fn publish(&self, event: StreamEvent) -> Result<(), Box<dyn std::error::Error>>;
}
