// src/utils/common.rs

use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    options::{BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions},
    protocol::basic::AMQPProperties,
    types::FieldTable,
    Channel, Connection, ConnectionProperties, Queue,
};
use tracing::{debug, info, instrument};

use crate::broker::{Connector, Delivery, DeliveryStream, QueueSession};
use crate::config::QueueConfig;
use crate::error::{CloseTarget, QueueError, Result};

const REPLY_SUCCESS: u16 = 200;

// Single attempt; the adapter never retries broker setup.
pub async fn connect_rabbitmq(addr: &str) -> Result<Connection> {
    let options = ConnectionProperties::default()
        .with_executor(tokio_executor_trait::Tokio::current())
        .with_reactor(tokio_reactor_trait::Tokio);

    let conn = Connection::connect(addr, options)
        .await
        .map_err(|e| QueueError::Connection(e.to_string()))?;
    info!("Successfully connected to RabbitMQ");
    Ok(conn)
}

/// Declares the queue with the adapter's fixed options: not durable, not
/// exclusive, not auto-deleted, no arguments.
pub async fn declare_queue(channel: &Channel, queue: &str) -> Result<Queue> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: false,
                exclusive: false,
                auto_delete: false,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| QueueError::QueueDeclare {
            queue: queue.to_string(),
            reason: e.to_string(),
        })
}

/// Broker handle backed by lapin.
pub struct AmqpSession {
    connection: Connection,
    channel: Channel,
    queue: Queue,
}

impl AmqpSession {
    #[instrument(skip(config), fields(queue = %config.queue))]
    pub async fn connect(config: &QueueConfig) -> Result<Self> {
        let connection = connect_rabbitmq(&config.connection).await?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| QueueError::ChannelOpen(e.to_string()))?;
        let queue = declare_queue(&channel, &config.queue).await?;
        info!(
            queue = %queue.name().as_str(),
            messages = queue.message_count(),
            consumers = queue.consumer_count(),
            "Declared queue"
        );
        Ok(Self {
            connection,
            channel,
            queue,
        })
    }
}

#[async_trait]
impl QueueSession for AmqpSession {
    fn queue_name(&self) -> &str {
        self.queue.name().as_str()
    }

    async fn consume(&self, auto_ack: bool, no_wait: bool) -> Result<DeliveryStream> {
        let consumer_tag = format!(
            "amqp-queue-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp()
        );
        let consumer = self
            .channel
            .basic_consume(
                self.queue_name(),
                &consumer_tag,
                BasicConsumeOptions {
                    no_ack: auto_ack,
                    nowait: no_wait,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| QueueError::ConsumeSetup {
                queue: self.queue_name().to_string(),
                reason: e.to_string(),
            })?;
        debug!(consumer_tag = %consumer_tag, "Started consuming");

        let deliveries = consumer.map(|delivery_result| {
            delivery_result
                .map(|delivery| Delivery {
                    delivery_tag: delivery.delivery_tag,
                    body: delivery.data,
                })
                .map_err(|e| QueueError::Receive(e.to_string()))
        });
        Ok(deliveries.boxed())
    }

    async fn ack(&self, delivery_tag: u64, multiple: bool) -> Result<()> {
        self.channel
            .basic_ack(delivery_tag, BasicAckOptions { multiple })
            .await
            .map_err(|e| QueueError::Ack {
                delivery_tag,
                reason: e.to_string(),
            })
    }

    async fn publish(&self, content_type: &str, body: &[u8]) -> Result<()> {
        let publish_error = |e: lapin::Error| QueueError::Publish {
            queue: self.queue_name().to_string(),
            reason: e.to_string(),
        };
        self.channel
            .basic_publish(
                "",
                self.queue_name(),
                BasicPublishOptions::default(),
                body,
                AMQPProperties::default().with_content_type(content_type.into()),
            )
            .await
            .map_err(publish_error)?
            .await
            .map_err(publish_error)?;
        Ok(())
    }

    async fn close_channel(&self) -> Result<()> {
        self.channel
            .close(REPLY_SUCCESS, "stream finished")
            .await
            .map_err(|e| QueueError::Disconnect {
                target: CloseTarget::Channel,
                reason: e.to_string(),
            })
    }

    async fn close_connection(&self) -> Result<()> {
        self.connection
            .close(REPLY_SUCCESS, "stream finished")
            .await
            .map_err(|e| QueueError::Disconnect {
                target: CloseTarget::Connection,
                reason: e.to_string(),
            })
    }
}

/// Connector that dials a real broker.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmqpConnector;

#[async_trait]
impl Connector for AmqpConnector {
    type Session = AmqpSession;

    async fn connect(&self, config: &QueueConfig) -> Result<AmqpSession> {
        AmqpSession::connect(config).await
    }
}
