use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::capture::capture_faces_use_case::CaptureFacesUseCase;
use crate::capture::capture_request::CaptureRequest;
use crate::pipeline::stream_faces_use_case::StreamFacesUseCase;
use crate::streaming::domain::quality::QualityController;

// Errors crossing the producer thread boundary must be Send.
type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Out-of-band control messages handled concurrently with the producer
/// loop.
#[derive(Clone, Debug)]
pub enum PipelineCommand {
    SetQuality(String),
    Capture(CaptureRequest),
    Shutdown,
}

/// Runs the producer loop on its own thread while servicing control
/// commands on the calling thread.
///
/// Quality changes and captures touch only shared state (the quality
/// controller and the snapshot store), so they never block frame
/// processing. Shutdown raises the cooperative stop flag and then joins
/// the producer, which releases the frame source before the thread
/// exits.
pub struct ThreadedStreamRunner {
    quality: Arc<QualityController>,
    stop: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl ThreadedStreamRunner {
    pub fn new(quality: Arc<QualityController>, stop: Arc<AtomicBool>) -> Self {
        Self {
            quality,
            stop,
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Blocks until the source is exhausted, a `Shutdown` command
    /// arrives, or the command channel disconnects.
    pub fn run(
        &self,
        mut stream: StreamFacesUseCase,
        capture: CaptureFacesUseCase,
        commands: Receiver<PipelineCommand>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let producer = thread::Builder::new()
            .name("frame-producer".into())
            .spawn(move || {
                stream
                    .execute()
                    .map_err(|e| -> SendError { e.to_string().into() })
            })?;

        loop {
            if producer.is_finished() {
                log::info!("Producer loop finished, stopping command dispatch");
                break;
            }
            match commands.recv_timeout(self.poll_interval) {
                Ok(PipelineCommand::SetQuality(name)) => {
                    self.quality.set_level_by_name(&name);
                }
                Ok(PipelineCommand::Capture(request)) => {
                    capture.execute(request);
                }
                Ok(PipelineCommand::Shutdown) => {
                    log::info!("Shutdown requested");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    log::info!("Command channel closed, shutting down");
                    break;
                }
            }
        }

        // Stop before joining so the producer sees the flag on its next
        // iteration and releases the source.
        self.stop.store(true, Ordering::Relaxed);
        match producer.join() {
            Ok(result) => result.map_err(|e| -> Box<dyn std::error::Error> { e }),
            Err(_) => Err("frame producer thread panicked".into()),
        }
    }
}
