use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Which half of a broker handle a close call was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTarget {
    Channel,
    Connection,
}

impl std::fmt::Display for CloseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseTarget::Channel => write!(f, "channel"),
            CloseTarget::Connection => write!(f, "connection"),
        }
    }
}

/// The Error type for queue adapter operations.
///
/// Broker errors are carried as strings so the enum stays `Clone + Send` and
/// can travel over the error channel to the host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Invalid configuration field '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to broker: {0}")]
    Connection(String),

    #[error("Failed to open channel: {0}")]
    ChannelOpen(String),

    #[error("Failed to declare queue '{queue}': {reason}")]
    QueueDeclare { queue: String, reason: String },

    #[error("Failed to start consuming from queue '{queue}': {reason}")]
    ConsumeSetup { queue: String, reason: String },

    #[error("Error receiving delivery: {0}")]
    Receive(String),

    #[error("Delivery stream for queue '{0}' ended unexpectedly")]
    DeliveryStreamClosed(String),

    #[error("Failed to acknowledge chunk ending at delivery {delivery_tag}: {reason}")]
    Ack { delivery_tag: u64, reason: String },

    #[error("Failed to publish to queue '{queue}': {reason}")]
    Publish { queue: String, reason: String },

    #[error("Failed to close {target}: {reason}")]
    Disconnect { target: CloseTarget, reason: String },
}

impl QueueError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        QueueError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors that end a producer stream when they show up at runtime.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            QueueError::Publish { .. } | QueueError::Disconnect { .. }
        )
    }
}

impl From<serde_yaml::Error> for QueueError {
    fn from(err: serde_yaml::Error) -> Self {
        QueueError::Config(format!("Failed to parse queue config YAML: {}", err))
    }
}
