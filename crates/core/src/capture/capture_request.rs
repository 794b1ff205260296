/// An on-demand capture trigger, arriving out-of-band from the producer
/// loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureRequest {
    /// Persist the full frame plus every current detection individually.
    All,
    /// Persist exactly the Nth detection, 1-indexed. An index beyond the
    /// current detection count is a no-op, not an error.
    Face(usize),
}
