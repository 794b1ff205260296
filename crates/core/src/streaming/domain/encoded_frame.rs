use crate::shared::detection::Detection;

/// A compressed frame ready for the publish channel.
///
/// `faces` is exactly the detection set that was rendered into `jpeg`;
/// the two never come from different ticks. Only the latest encoded
/// frame is retained anywhere in the process.
#[derive(Clone, Debug)]
pub struct EncodedFrame {
    pub jpeg: Vec<u8>,
    pub faces: Vec<Detection>,
    pub timestamp: f64,
}
