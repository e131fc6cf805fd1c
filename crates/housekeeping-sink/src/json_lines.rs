//! JSON-lines implementation of `VerdictSink`.
//!
//! Each verdict record becomes one line of compact JSON followed by `\n`,
//! flushed immediately so a log shipper tailing the stream sees complete
//! records. The writer sits behind a `Mutex` so the sink is `Sync`.

use std::io::{self, Write};
use std::sync::Mutex;

use tracing::trace;

use housekeeping_contracts::{
    error::{HousekeepingError, HousekeepingResult},
    verdict::VerdictRecord,
};
use housekeeping_core::traits::VerdictSink;

pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JsonLinesSink<io::Stdout> {
    /// A sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> VerdictSink for JsonLinesSink<W> {
    /// Serialize `record` and write it as one line.
    ///
    /// Returns `Err(SinkWriteFailed)` if serialization or the write fails,
    /// or if the writer lock is poisoned.
    fn emit(&self, record: &VerdictRecord) -> HousekeepingResult<()> {
        let mut line = serde_json::to_vec(record).map_err(|e| HousekeepingError::SinkWriteFailed {
            reason: format!("failed to serialize verdict for '{}': {}", record.subject, e),
        })?;
        line.push(b'\n');

        let mut writer = self.writer.lock().map_err(|e| HousekeepingError::SinkWriteFailed {
            reason: format!("sink writer lock poisoned: {}", e),
        })?;

        writer
            .write_all(&line)
            .and_then(|()| writer.flush())
            .map_err(|e| HousekeepingError::SinkWriteFailed {
                reason: format!("failed to write verdict for '{}': {}", record.subject, e),
            })?;

        trace!(pod = %record.subject, bytes = line.len(), "verdict written");
        Ok(())
    }
}
