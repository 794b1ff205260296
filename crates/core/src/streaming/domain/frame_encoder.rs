use crate::shared::detection::Detection;
use crate::shared::frame::Frame;
use crate::streaming::domain::encoded_frame::EncodedFrame;

/// Turns a frame and its detection set into a transmissible encoding.
///
/// This is the dominant cost of a published tick and must only run when
/// the throttle decides to publish.
pub trait FrameEncoder: Send {
    fn encode(
        &self,
        frame: &Frame,
        faces: &[Detection],
        timestamp: f64,
    ) -> Result<EncodedFrame, Box<dyn std::error::Error>>;
}
