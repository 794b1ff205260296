use crate::shared::constants::NOTIFICATION_COOLDOWN_SECS;

/// Tracks detection-presence transitions and suppresses repeat
/// notifications within a cooldown window.
///
/// A notification fires when detection is fresh (nothing was detected on
/// the previous tick) or when detection has persisted past the cooldown,
/// so one continuous presence surfaces periodically instead of flooding
/// every tick. A zero-count tick clears the presence flag immediately,
/// which deliberately re-arms the "fresh" path even inside the cooldown
/// window when the count oscillates between 0 and >0.
#[derive(Debug)]
pub struct DetectionDebouncer {
    was_detected: bool,
    last_notified_at: f64,
    cooldown: f64,
}

impl DetectionDebouncer {
    pub fn new() -> Self {
        Self::with_cooldown(NOTIFICATION_COOLDOWN_SECS)
    }

    pub fn with_cooldown(cooldown: f64) -> Self {
        Self {
            was_detected: false,
            last_notified_at: 0.0,
            cooldown,
        }
    }

    /// Feeds one tick's detection count; true means "emit a notification
    /// now". Mutates state exactly once per loop iteration.
    pub fn observe(&mut self, detection_count: usize, now: f64) -> bool {
        if detection_count == 0 {
            self.was_detected = false;
            return false;
        }
        if !self.was_detected || now - self.last_notified_at > self.cooldown {
            self.last_notified_at = now;
            self.was_detected = true;
            return true;
        }
        false
    }
}

impl Default for DetectionDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
