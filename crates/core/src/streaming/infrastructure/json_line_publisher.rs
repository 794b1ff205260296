use std::io::Write;
use std::sync::Mutex;

use crate::streaming::domain::event_publisher::{EventPublisher, StreamEvent};

/// Serialises each event as one JSON line to an arbitrary writer.
///
/// Stands in for the real transport at the process boundary; the CLI
/// points it at stdout so viewers (or a bridge) can tail the stream.
pub struct JsonLinePublisher<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinePublisher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> EventPublisher for JsonLinePublisher<W> {
    fn publish(&self, event: StreamEvent) -> Result<(), Box<dyn std::error::Error>> {
        let line = serde_json::to_string(&event)?;
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}
