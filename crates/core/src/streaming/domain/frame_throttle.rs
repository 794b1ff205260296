/// Decides, per captured frame, whether enough wall-clock time has
/// elapsed to justify re-encoding and publishing.
///
/// The decision is independent of detection results: frames publish on a
/// steady cadence whether or not any face is present. The interval is
/// read fresh on every decision, so a quality change takes effect on the
/// very next tick.
#[derive(Debug, Default)]
pub struct FrameThrottle {
    last_published: Option<f64>,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `now - last_published >= interval`, or nothing has been
    /// published yet. Does not record a publish by itself.
    pub fn should_publish(&self, now: f64, interval: f64) -> bool {
        match self.last_published {
            None => true,
            Some(last) => now - last >= interval,
        }
    }

    pub fn mark_published(&mut self, now: f64) {
        self.last_published = Some(now);
    }
}
