// src/broker.rs

use crate::config::QueueConfig;
use crate::error::{CloseTarget, QueueError, Result};
use crate::reporting::ErrorReporter;
use crate::utils::prometheus_metrics::DISCONNECT_ERRORS_TOTAL;
use async_trait::async_trait;
use futures::stream::BoxStream;
use tracing::{debug, info};

/// One message handed over by the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Channel-scoped identifier used for acknowledgment.
    pub delivery_tag: u64,
    pub body: Vec<u8>,
}

/// Deliveries in the order the broker hands them out.
pub type DeliveryStream = BoxStream<'static, Result<Delivery>>;

/// A connection, a channel on it and one declared queue.
///
/// A session belongs to exactly one stream instance and is dropped after
/// `disconnect` has run on it.
#[async_trait]
pub trait QueueSession: Send + Sync + 'static {
    /// Name of the declared queue as the broker reported it.
    fn queue_name(&self) -> &str;

    /// Starts delivery from the declared queue.
    async fn consume(&self, auto_ack: bool, no_wait: bool) -> Result<DeliveryStream>;

    /// Acknowledges `delivery_tag`, and every earlier unacknowledged delivery
    /// when `multiple` is set.
    async fn ack(&self, delivery_tag: u64, multiple: bool) -> Result<()>;

    /// Publishes `body` to the default exchange, routed to the declared queue.
    async fn publish(&self, content_type: &str, body: &[u8]) -> Result<()>;

    async fn close_channel(&self) -> Result<()>;

    async fn close_connection(&self) -> Result<()>;
}

/// Opens sessions for resolved configs.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: QueueSession;

    /// Opens the connection, then the channel, then declares the queue.
    /// The first failing step aborts the rest.
    async fn connect(&self, config: &QueueConfig) -> Result<Self::Session>;
}

/// Closes the channel and then the connection of a session.
///
/// Both closes are always attempted. Failures go to the reporter and are
/// never returned, so teardown always completes.
pub async fn disconnect<S: QueueSession + ?Sized>(session: &S, reporter: &mut ErrorReporter) {
    let queue = session.queue_name().to_string();

    match session.close_channel().await {
        Ok(()) => debug!(queue = %queue, "Channel closed"),
        Err(e) => {
            DISCONNECT_ERRORS_TOTAL.inc();
            reporter.report(QueueError::Disconnect {
                target: CloseTarget::Channel,
                reason: close_reason(e),
            });
        }
    }

    match session.close_connection().await {
        Ok(()) => debug!(queue = %queue, "Connection closed"),
        Err(e) => {
            DISCONNECT_ERRORS_TOTAL.inc();
            reporter.report(QueueError::Disconnect {
                target: CloseTarget::Connection,
                reason: close_reason(e),
            });
        }
    }

    info!(queue = %queue, "Disconnected from broker");
}

fn close_reason(err: QueueError) -> String {
    match err {
        QueueError::Disconnect { reason, .. } => reason,
        other => other.to_string(),
    }
}
