use crate::shared::frame::Frame;

/// Supplies frames to the producer loop.
///
/// `Ok(None)` signals end-of-stream and terminates the loop; an
/// acquisition error is treated the same way by the pipeline, never as a
/// crash. How frames are physically acquired is out of scope behind this
/// seam.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the capture device / underlying resources.
    fn close(&mut self);
}
