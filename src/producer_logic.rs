// src/producer_logic.rs

use crate::broker::{disconnect, Delivery, QueueSession};
use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::reporting::ErrorReporter;
use crate::utils::prometheus_metrics::*;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Upper bound on the chunk buffer allocated up front; larger chunks grow as
/// deliveries arrive.
const MAX_CHUNK_PREALLOC: usize = 1024;

/// Streaming function handed to the host for the producer role.
///
/// The host keeps the receiving ends of both channels. Each channel is
/// closed exactly once, when the function finishes.
pub type Producer = Box<
    dyn FnOnce(mpsc::Sender<Vec<u8>>, mpsc::Sender<QueueError>) -> BoxFuture<'static, ()> + Send,
>;

/// Lifecycle of a producer stream. There is no way back from `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Init,
    Streaming,
    Closed,
}

/// Why a producer stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `stop-after` messages were forwarded.
    StopAfterReached,
    /// The host dropped the output receiver.
    OutputClosed,
    /// A fatal error was reported on the error channel.
    Failed,
}

/// Drains one queue in fixed-size chunks into a pipeline channel.
pub struct ProducerStream<S: QueueSession> {
    config: QueueConfig,
    session: S,
    state: StreamState,
    forwarded: u64,
}

impl<S: QueueSession> ProducerStream<S> {
    pub fn new(config: QueueConfig, session: S) -> Self {
        Self {
            config,
            session,
            state: StreamState::Init,
            forwarded: 0,
        }
    }

    /// Runs the stream to completion, then closes `output`, disconnects the
    /// session and closes `errors`, in that order.
    #[instrument(skip_all, fields(queue = %self.config.queue, chunk_size = self.config.chunk_size))]
    pub async fn run(mut self, output: mpsc::Sender<Vec<u8>>, errors: mpsc::Sender<QueueError>) {
        ACTIVE_STREAMS.inc();
        let mut reporter = ErrorReporter::new(errors);

        let reason = self.stream_messages(&output, &mut reporter).await;
        info!(
            ?reason,
            last_state = ?self.state,
            forwarded = self.forwarded,
            "Producer stream stopped"
        );
        self.state = StreamState::Closed;

        drop(output);
        disconnect(&self.session, &mut reporter).await;
        drop(reporter);
        ACTIVE_STREAMS.dec();
    }

    /// Runs the stream as its own tokio task.
    pub fn spawn(
        self,
        output: mpsc::Sender<Vec<u8>>,
        errors: mpsc::Sender<QueueError>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(output, errors))
    }

    async fn stream_messages(
        &mut self,
        output: &mpsc::Sender<Vec<u8>>,
        reporter: &mut ErrorReporter,
    ) -> StopReason {
        let mut deliveries = match self
            .session
            .consume(self.config.auto_ack, self.config.no_wait)
            .await
        {
            Ok(deliveries) => deliveries,
            Err(e) => {
                RECEIVE_ERRORS_TOTAL.inc();
                reporter.report(e);
                return StopReason::Failed;
            }
        };
        self.state = StreamState::Streaming;
        debug!(auto_ack = self.config.auto_ack, no_wait = self.config.no_wait, "Consuming");

        let chunk_size = self.config.chunk_size;
        let mut chunk: Vec<Delivery> = Vec::with_capacity(chunk_size.min(MAX_CHUNK_PREALLOC));

        loop {
            // A chunk is only released once it is full; a slow queue stalls here.
            while chunk.len() < chunk_size {
                match deliveries.next().await {
                    Some(Ok(delivery)) => chunk.push(delivery),
                    Some(Err(e)) => {
                        RECEIVE_ERRORS_TOTAL.inc();
                        reporter.report(e);
                        return StopReason::Failed;
                    }
                    None => {
                        RECEIVE_ERRORS_TOTAL.inc();
                        reporter.report(QueueError::DeliveryStreamClosed(
                            self.session.queue_name().to_string(),
                        ));
                        return StopReason::Failed;
                    }
                }
            }

            if !self.config.auto_ack {
                if let Some(last) = chunk.last() {
                    if let Err(e) = self.session.ack(last.delivery_tag, true).await {
                        ACK_ERRORS_TOTAL.inc();
                        reporter.report(e);
                        return StopReason::Failed;
                    }
                    CHUNKS_ACKED_TOTAL.inc();
                    debug!(delivery_tag = last.delivery_tag, "Acknowledged chunk");
                }
            }

            for delivery in chunk.drain(..) {
                if output.send(delivery.body).await.is_err() {
                    warn!(
                        delivery_tag = delivery.delivery_tag,
                        "Output receiver dropped, stopping producer"
                    );
                    return StopReason::OutputClosed;
                }
                self.forwarded += 1;
                MESSAGES_FORWARDED_TOTAL.inc();

                if self.config.stop_after != 0 && self.forwarded >= self.config.stop_after {
                    return StopReason::StopAfterReached;
                }
            }
        }
    }
}

/// Wraps a resolved config and an open session into a [`Producer`].
pub fn produce<S: QueueSession>(config: QueueConfig, session: S) -> Producer {
    Box::new(move |output, errors| ProducerStream::new(config, session).run(output, errors).boxed())
}
