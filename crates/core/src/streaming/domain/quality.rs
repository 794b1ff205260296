use std::sync::atomic::{AtomicU8, Ordering};

use crate::shared::constants::{
    HIGH_QUALITY_INTERVAL_SECS, LOW_QUALITY_INTERVAL_SECS, MEDIUM_QUALITY_INTERVAL_SECS,
};

/// Named stream-quality preset controlling the throttle interval.
///
/// Lower quality means a longer interval: fewer frames, more stability
/// on slow viewers. Unrecognised names resolve to `Medium` rather than
/// failing — the command channel must never leave the controller in an
/// undefined state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualityLevel {
    Low,
    Medium,
    High,
}

impl QualityLevel {
    pub fn from_name(name: &str) -> Self {
        match name {
            "low" => QualityLevel::Low,
            "high" => QualityLevel::High,
            _ => QualityLevel::Medium,
        }
    }

    /// Minimum wall-clock spacing between two published frames, seconds.
    pub fn interval_secs(&self) -> f64 {
        match self {
            QualityLevel::Low => LOW_QUALITY_INTERVAL_SECS,
            QualityLevel::Medium => MEDIUM_QUALITY_INTERVAL_SECS,
            QualityLevel::High => HIGH_QUALITY_INTERVAL_SECS,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            QualityLevel::Low => 0,
            QualityLevel::Medium => 1,
            QualityLevel::High => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => QualityLevel::Low,
            2 => QualityLevel::High,
            _ => QualityLevel::Medium,
        }
    }
}

/// Process-wide quality state: written by the command channel, read by
/// the frame throttle on every iteration.
///
/// Single writer, many readers, no locking — a plain atomic cell whose
/// effect is observed on the very next throttle decision. Its lifetime
/// equals the pipeline's; there is no teardown.
#[derive(Debug)]
pub struct QualityController {
    level: AtomicU8,
}

impl QualityController {
    pub fn new(initial: QualityLevel) -> Self {
        Self {
            level: AtomicU8::new(initial.as_u8()),
        }
    }

    pub fn set_level(&self, level: QualityLevel) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// Accepts a raw name from the command channel; unknown names map to
    /// the Medium default.
    pub fn set_level_by_name(&self, name: &str) {
        let level = QualityLevel::from_name(name);
        log::info!("Stream quality changed to {level:?}");
        self.set_level(level);
    }

    pub fn level(&self) -> QualityLevel {
        QualityLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    pub fn interval_secs(&self) -> f64 {
        self.level().interval_secs()
    }
}

impl Default for QualityController {
    fn default() -> Self {
        Self::new(QualityLevel::Medium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("low", QualityLevel::Low)]
    #[case("medium", QualityLevel::Medium)]
    #[case("high", QualityLevel::High)]
    #[case("ultra", QualityLevel::Medium)]
    #[case("", QualityLevel::Medium)]
    fn test_from_name(#[case] name: &str, #[case] expected: QualityLevel) {
        assert_eq!(QualityLevel::from_name(name), expected);
    }

    #[rstest]
    #[case(QualityLevel::Low, 0.40)]
    #[case(QualityLevel::Medium, 0.25)]
    #[case(QualityLevel::High, 0.18)]
    fn test_intervals(#[case] level: QualityLevel, #[case] secs: f64) {
        assert_relative_eq!(level.interval_secs(), secs);
    }

    #[test]
    fn test_controller_defaults_to_medium() {
        let controller = QualityController::default();
        assert_eq!(controller.level(), QualityLevel::Medium);
    }

    #[test]
    fn test_set_by_name_visible_immediately() {
        let controller = QualityController::default();
        controller.set_level_by_name("high");
        assert_relative_eq!(controller.interval_secs(), 0.18);
    }

    #[test]
    fn test_unknown_name_resolves_to_medium() {
        let controller = QualityController::new(QualityLevel::High);
        controller.set_level_by_name("potato");
        assert_eq!(controller.level(), QualityLevel::Medium);
    }

    #[test]
    fn test_readable_across_threads() {
        use std::sync::Arc;
        let controller = Arc::new(QualityController::default());
        let reader = controller.clone();
        controller.set_level(QualityLevel::Low);
        let handle = std::thread::spawn(move || reader.level());
        assert_eq!(handle.join().unwrap(), QualityLevel::Low);
    }
}
