use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::streaming::domain::event_publisher::{EventPublisher, StreamEvent};

/// In-process publisher backed by a bounded crossbeam channel.
///
/// Best-effort by construction: when the channel is full or the consumer
/// is gone, the event is dropped and the producer keeps its cadence. The
/// serving side drains the receiver at its own pace.
pub struct ChannelPublisher {
    tx: Sender<StreamEvent>,
}

impl ChannelPublisher {
    pub fn new(capacity: usize) -> (Self, Receiver<StreamEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event: StreamEvent) -> Result<(), Box<dyn std::error::Error>> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                log::debug!("Publish channel full, dropping event");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("Publish channel disconnected, dropping event");
                Ok(())
            }
        }
    }
}
