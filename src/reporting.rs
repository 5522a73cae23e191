// src/reporting.rs

use crate::error::QueueError;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Buffer size of channels built by [`error_channel`].
pub const ERROR_CHANNEL_CAPACITY: usize = 32;

/// Builds a bounded error channel suitable for handing to a stream.
pub fn error_channel() -> (mpsc::Sender<QueueError>, mpsc::Receiver<QueueError>) {
    mpsc::channel(ERROR_CHANNEL_CAPACITY)
}

/// Sending side of a stream's error channel.
///
/// Logging the error is left to the host draining the channel; `report`
/// only traces it at debug level. `report` never waits on the host. A host that is not draining the channel
/// loses the newest errors once the buffer is full instead of stalling the
/// worker. Dropping the reporter closes the channel.
#[derive(Debug)]
pub struct ErrorReporter {
    tx: mpsc::Sender<QueueError>,
    dropped: u64,
}

impl ErrorReporter {
    pub fn new(tx: mpsc::Sender<QueueError>) -> Self {
        Self { tx, dropped: 0 }
    }

    pub fn report(&mut self, err: QueueError) {
        debug!(error = %err, "Reporting stream error");
        match self.tx.try_send(err) {
            Ok(()) => {}
            Err(TrySendError::Full(err)) => {
                self.dropped += 1;
                warn!(error = %err, dropped = self.dropped, "Error channel full, dropping error");
            }
            Err(TrySendError::Closed(err)) => {
                debug!(error = %err, "Error channel receiver gone, error not delivered");
            }
        }
    }

    /// Number of errors discarded because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
