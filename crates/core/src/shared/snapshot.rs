use std::sync::{Arc, Mutex};

use crate::shared::detection::Detection;
use crate::shared::frame::Frame;
use crate::streaming::domain::encoded_frame::EncodedFrame;

/// The most recent frame and its detection set, captured as one unit.
#[derive(Clone, Debug)]
pub struct FrameSnapshot {
    pub frame: Frame,
    pub faces: Vec<Detection>,
    pub timestamp: f64,
}

/// Process-wide latest pipeline state, shared between the producer loop
/// and the serving context.
///
/// Each slot holds an `Arc` that is replaced wholesale once per tick, so
/// readers always see a frame paired with its own detection set and an
/// encoded frame paired with its own metadata — never a torn update.
/// Last-writer-wins; no history is retained beyond the latest value.
#[derive(Default)]
pub struct SnapshotStore {
    current: Mutex<Option<Arc<FrameSnapshot>>>,
    encoded: Mutex<Option<Arc<EncodedFrame>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_current(&self, snapshot: FrameSnapshot) {
        *self.current.lock().unwrap() = Some(Arc::new(snapshot));
    }

    pub fn latest(&self) -> Option<Arc<FrameSnapshot>> {
        self.current.lock().unwrap().clone()
    }

    pub fn update_encoded(&self, encoded: Arc<EncodedFrame>) {
        *self.encoded.lock().unwrap() = Some(encoded);
    }

    pub fn latest_encoded(&self) -> Option<Arc<EncodedFrame>> {
        self.encoded.lock().unwrap().clone()
    }
}
