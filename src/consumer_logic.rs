// src/consumer_logic.rs

use crate::broker::{disconnect, QueueSession};
use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::reporting::ErrorReporter;
use crate::utils::prometheus_metrics::*;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Streaming function handed to the host for the consumer role.
///
/// The host feeds the input channel and closes it when done; `done` fires
/// once after the last item has been handled.
pub type Consumer = Box<
    dyn FnOnce(
            mpsc::Receiver<Vec<u8>>,
            mpsc::Sender<QueueError>,
            oneshot::Sender<()>,
        ) -> BoxFuture<'static, ()>
        + Send,
>;

/// Publishes pipeline items onto one queue.
pub struct ConsumerStream<S: QueueSession> {
    config: QueueConfig,
    session: S,
}

impl<S: QueueSession> ConsumerStream<S> {
    pub fn new(config: QueueConfig, session: S) -> Self {
        Self { config, session }
    }

    /// Publishes every item until `input` closes, then signals `done`,
    /// disconnects the session and closes `errors`, in that order.
    #[instrument(skip_all, fields(queue = %self.config.queue))]
    pub async fn run(
        self,
        mut input: mpsc::Receiver<Vec<u8>>,
        errors: mpsc::Sender<QueueError>,
        done: oneshot::Sender<()>,
    ) {
        ACTIVE_STREAMS.inc();
        let mut reporter = ErrorReporter::new(errors);
        let mut published = 0u64;
        let mut failed = 0u64;

        while let Some(item) = input.recv().await {
            let timer = PUBLISH_DURATION_SECONDS.start_timer();
            let result = self
                .session
                .publish(&self.config.content_type, &item)
                .await;
            timer.observe_duration();

            match result {
                Ok(()) => {
                    published += 1;
                    MESSAGES_PUBLISHED_TOTAL.inc();
                    debug!(bytes = item.len(), "Published item");
                }
                Err(e) => {
                    failed += 1;
                    PUBLISH_ERRORS_TOTAL.inc();
                    reporter.report(e);
                }
            }
        }
        info!(published, failed, "Input closed, consumer stream finishing");

        if done.send(()).is_err() {
            debug!("Completion receiver dropped before done was signalled");
        }
        disconnect(&self.session, &mut reporter).await;
        drop(reporter);
        ACTIVE_STREAMS.dec();
    }

    /// Runs the stream as its own tokio task.
    pub fn spawn(
        self,
        input: mpsc::Receiver<Vec<u8>>,
        errors: mpsc::Sender<QueueError>,
        done: oneshot::Sender<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(input, errors, done))
    }
}

/// Wraps a resolved config and an open session into a [`Consumer`].
pub fn consume<S: QueueSession>(config: QueueConfig, session: S) -> Consumer {
    Box::new(move |input, errors, done| {
        ConsumerStream::new(config, session)
            .run(input, errors, done)
            .boxed()
    })
}
