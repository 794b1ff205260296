use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::snapshot::{FrameSnapshot, SnapshotStore};
use crate::streaming::domain::detection_debouncer::DetectionDebouncer;
use crate::streaming::domain::event_publisher::{EventPublisher, StreamEvent};
use crate::streaming::domain::frame_encoder::FrameEncoder;
use crate::streaming::domain::frame_throttle::FrameThrottle;
use crate::streaming::domain::quality::QualityController;
use crate::video::domain::frame_source::FrameSource;

/// Wall-clock seconds used for throttle decisions, debouncing and wire
/// timestamps. Injectable so tests can drive the loop deterministically.
pub type Clock = Box<dyn Fn() -> f64 + Send>;

pub fn system_clock() -> Clock {
    Box::new(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    })
}

/// The producer loop: capture → detect → snapshot → throttle/encode →
/// debounce/notify.
///
/// Runs until the frame source is exhausted, acquisition fails, or the
/// cooperative stop flag is raised; the flag is checked once per
/// iteration and the source is released on exit. All publishes from
/// this loop carry non-decreasing timestamps since a single thread
/// reads a monotonic-enough wall clock once per tick.
pub struct StreamFacesUseCase {
    source: Box<dyn FrameSource>,
    detector: Box<dyn FaceDetector>,
    encoder: Box<dyn FrameEncoder>,
    publisher: Box<dyn EventPublisher>,
    snapshots: Arc<SnapshotStore>,
    quality: Arc<QualityController>,
    stop: Arc<AtomicBool>,
    clock: Clock,
    throttle: FrameThrottle,
    debouncer: DetectionDebouncer,
}

impl StreamFacesUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn FaceDetector>,
        encoder: Box<dyn FrameEncoder>,
        publisher: Box<dyn EventPublisher>,
        snapshots: Arc<SnapshotStore>,
        quality: Arc<QualityController>,
        stop: Arc<AtomicBool>,
        clock: Clock,
    ) -> Self {
        Self {
            source,
            detector,
            encoder,
            publisher,
            snapshots,
            quality,
            stop,
            clock,
            throttle: FrameThrottle::new(),
            debouncer: DetectionDebouncer::new(),
        }
    }

    pub fn execute(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Face detection pipeline started");
        loop {
            if self.stop.load(Ordering::Relaxed) {
                log::info!("Stop signal received, leaving producer loop");
                break;
            }
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("Frame source exhausted, leaving producer loop");
                    break;
                }
                Err(e) => {
                    // Acquisition failure is end-of-stream, not a crash
                    log::warn!("Failed to grab frame: {e}");
                    break;
                }
            };
            self.process_frame(frame)?;
        }
        self.source.close();
        Ok(())
    }

    fn process_frame(&mut self, frame: Frame) -> Result<(), Box<dyn std::error::Error>> {
        let now = (self.clock)();
        let faces = self.detector.detect(&frame)?;

        self.snapshots.update_current(FrameSnapshot {
            frame: frame.clone(),
            faces: faces.clone(),
            timestamp: now,
        });

        // Steady publish cadence, independent of detection results
        let interval = self.quality.interval_secs();
        if self.throttle.should_publish(now, interval) {
            let encoded = Arc::new(self.encoder.encode(&frame, &faces, now)?);
            self.snapshots.update_encoded(encoded.clone());
            if let Err(e) = self.publisher.publish(StreamEvent::frame_update(&encoded)) {
                log::warn!("Failed to publish frame update: {e}");
            }
            self.throttle.mark_published(now);
        }

        if self.debouncer.observe(faces.len(), now) {
            log::info!("ALERT: {} face(s) detected", faces.len());
            let latest = self.snapshots.latest_encoded();
            let event = StreamEvent::face_detected(faces.len(), now, latest.as_deref(), &faces);
            if let Err(e) = self.publisher.publish(event) {
                log::warn!("Failed to publish detection alert: {e}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::detection::Detection;
    use crate::shared::frame::Frame;
    use crate::streaming::domain::encoded_frame::EncodedFrame;
    use std::sync::Mutex;

    // --- Stubs ---

    struct StubSource {
        remaining: usize,
    }

    impl FrameSource for StubSource {
        fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(Frame::new(vec![0; 640 * 480 * 3], 640, 480, 3, 0)))
        }

        fn close(&mut self) {}
    }

    struct FailingSource;

    impl FrameSource for FailingSource {
        fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
            Err("device unplugged".into())
        }

        fn close(&mut self) {}
    }

    struct StubDetector {
        faces: Vec<Detection>,
    }

    impl FaceDetector for StubDetector {
        fn detect(&mut self, _: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            Ok(self.faces.clone())
        }
    }

    struct StubEncoder;

    impl FrameEncoder for StubEncoder {
        fn encode(
            &self,
            _frame: &Frame,
            faces: &[Detection],
            timestamp: f64,
        ) -> Result<EncodedFrame, Box<dyn std::error::Error>> {
            Ok(EncodedFrame {
                jpeg: vec![0xFF, 0xD8],
                faces: faces.to_vec(),
                timestamp,
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingPublisher {
        events: Arc<Mutex<Vec<StreamEvent>>>,
    }

    impl EventPublisher for RecordingPublisher {
        fn publish(&self, event: StreamEvent) -> Result<(), Box<dyn std::error::Error>> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    /// Clock returning scripted instants, one per tick.
    fn scripted_clock(times: Vec<f64>) -> Clock {
        let queue = Mutex::new(times.into_iter());
        Box::new(move || queue.lock().unwrap().next().expect("clock exhausted"))
    }

    fn run_pipeline(
        frames: usize,
        faces: Vec<Detection>,
        times: Vec<f64>,
        quality_name: &str,
    ) -> (Vec<StreamEvent>, Arc<SnapshotStore>) {
        let publisher = RecordingPublisher::default();
        let events = publisher.events.clone();
        let snapshots = Arc::new(SnapshotStore::new());
        let quality = Arc::new(QualityController::default());
        quality.set_level_by_name(quality_name);

        let mut uc = StreamFacesUseCase::new(
            Box::new(StubSource { remaining: frames }),
            Box::new(StubDetector { faces }),
            Box::new(StubEncoder),
            Box::new(publisher),
            snapshots.clone(),
            quality,
            Arc::new(AtomicBool::new(false)),
            scripted_clock(times),
        );
        uc.execute().unwrap();
        let recorded = events.lock().unwrap().clone();
        (recorded, snapshots)
    }

    fn frame_updates(events: &[StreamEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::FrameUpdate(f) => Some(f.timestamp),
                _ => None,
            })
            .collect()
    }

    fn alerts(events: &[StreamEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::FaceDetected(f) => Some(f.timestamp),
                _ => None,
            })
            .collect()
    }

    // --- Tests ---

    #[test]
    fn test_high_quality_scenario_publishes_on_cadence() {
        // 640x480, one detection, quality high (0.18s interval), 20 Hz ticks
        let face = Detection::new(100, 100, 50, 50, 0.95);
        let times = vec![0.0, 0.05, 0.10, 0.15, 0.20];
        let (events, _) = run_pipeline(5, vec![face], times, "high");

        // Throttle: publish at t=0.00, decline until t=0.20
        assert_eq!(frame_updates(&events), vec![0.0, 0.20]);
        // Debouncer: fresh detection notifies at t=0.00 only
        assert_eq!(alerts(&events), vec![0.0]);
    }

    #[test]
    fn test_frames_publish_without_any_detection() {
        let times = vec![0.0, 0.30, 0.60];
        let (events, _) = run_pipeline(3, vec![], times, "medium");
        assert_eq!(frame_updates(&events), vec![0.0, 0.30, 0.60]);
        assert!(alerts(&events).is_empty());
    }

    #[test]
    fn test_published_timestamps_are_non_decreasing() {
        let face = Detection::new(0, 0, 50, 50, 0.9);
        let times: Vec<f64> = (0..40).map(|i| i as f64 * 0.1).collect();
        let (events, _) = run_pipeline(40, vec![face], times, "low");

        let mut all: Vec<f64> = Vec::new();
        for e in &events {
            match e {
                StreamEvent::FrameUpdate(f) => all.push(f.timestamp),
                StreamEvent::FaceDetected(f) => all.push(f.timestamp),
            }
        }
        assert!(all.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_sustained_detection_realerts_after_cooldown() {
        let face = Detection::new(0, 0, 50, 50, 0.9);
        let times: Vec<f64> = (0..110).map(|i| i as f64 * 0.1).collect();
        let (events, _) = run_pipeline(110, vec![face], times, "low");

        let alert_times = alerts(&events);
        assert!(alert_times.len() >= 2);
        for pair in alert_times.windows(2) {
            assert!(pair[1] - pair[0] >= 5.0);
        }
    }

    #[test]
    fn test_alert_carries_latest_encoded_frame_and_faces() {
        let face = Detection::new(1, 2, 3, 4, 0.88);
        let (events, _) = run_pipeline(1, vec![face.clone()], vec![0.0], "medium");

        let alert = events
            .iter()
            .find_map(|e| match e {
                StreamEvent::FaceDetected(f) => Some(f.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(alert.count, 1);
        assert_eq!(alert.faces, vec![face]);
        // The frame published this same tick is attached
        assert!(alert.image.is_some());
    }

    #[test]
    fn test_snapshots_track_the_latest_tick() {
        let face = Detection::new(0, 0, 10, 10, 0.9);
        let times = vec![0.0, 0.30];
        let (_, snapshots) = run_pipeline(2, vec![face], times, "medium");

        let current = snapshots.latest().unwrap();
        assert_eq!(current.timestamp, 0.30);
        assert_eq!(current.faces.len(), 1);
        let encoded = snapshots.latest_encoded().unwrap();
        assert_eq!(encoded.timestamp, 0.30);
        assert_eq!(encoded.faces, current.faces);
    }

    #[test]
    fn test_stop_flag_ends_loop_before_next_frame() {
        let publisher = RecordingPublisher::default();
        let events = publisher.events.clone();
        let stop = Arc::new(AtomicBool::new(true));

        let mut uc = StreamFacesUseCase::new(
            Box::new(StubSource { remaining: 100 }),
            Box::new(StubDetector { faces: vec![] }),
            Box::new(StubEncoder),
            Box::new(publisher),
            Arc::new(SnapshotStore::new()),
            Arc::new(QualityController::default()),
            stop,
            scripted_clock(vec![]),
        );
        uc.execute().unwrap();
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_acquisition_failure_ends_loop_gracefully() {
        let publisher = RecordingPublisher::default();
        let mut uc = StreamFacesUseCase::new(
            Box::new(FailingSource),
            Box::new(StubDetector { faces: vec![] }),
            Box::new(StubEncoder),
            Box::new(publisher),
            Arc::new(SnapshotStore::new()),
            Arc::new(QualityController::default()),
            Arc::new(AtomicBool::new(false)),
            scripted_clock(vec![]),
        );
        assert!(uc.execute().is_ok());
    }

    #[test]
    fn test_quality_change_takes_effect_next_tick() {
        let publisher = RecordingPublisher::default();
        let events = publisher.events.clone();
        let quality = Arc::new(QualityController::default());
        quality.set_level_by_name("low"); // 0.40s

        let quality_handle = quality.clone();
        let mut uc = StreamFacesUseCase::new(
            Box::new(StubSource { remaining: 2 }),
            Box::new(StubDetector { faces: vec![] }),
            Box::new(StubEncoder),
            Box::new(publisher),
            Arc::new(SnapshotStore::new()),
            quality,
            Arc::new(AtomicBool::new(false)),
            scripted_clock(vec![0.0, 0.20]),
        );

        // First tick publishes at t=0. Under "low" the t=0.20 tick would
        // be throttled; switching to "high" before it runs unblocks it.
        quality_handle.set_level_by_name("high");
        uc.execute().unwrap();
        assert_eq!(frame_updates(&events.lock().unwrap()), vec![0.0, 0.20]);
    }
}
