// src/resource.rs

//! Entry points a pipeline host uses to obtain queue streams.
//!
//! Factories resolve the configuration and open the broker session up
//! front. Anything that fails there is returned to the caller and no stream
//! function is produced; everything after that travels over channels.

use crate::broker::Connector;
use crate::config::{ConfigParser, FieldSpec, QueueConfig, QUEUE_CONFIG_SPEC};
use crate::consumer_logic::{consume, Consumer};
use crate::error::Result;
use crate::producer_logic::{produce, Producer};
use crate::utils::common::AmqpConnector;
use tracing::info;

pub const PLUGIN_NAME: &str = "amqp";
pub const RESOURCE_NAME: &str = "amqp-queue";

/// Roles a resource can be used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kinds(u8);

impl Kinds {
    pub const PRODUCER: Kinds = Kinds(0b01);
    pub const CONSUMER: Kinds = Kinds(0b10);

    pub const fn union(self, other: Kinds) -> Kinds {
        Kinds(self.0 | other.0)
    }

    pub const fn contains(self, other: Kinds) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Kinds {
    type Output = Kinds;

    fn bitor(self, rhs: Kinds) -> Kinds {
        self.union(rhs)
    }
}

/// Descriptor of the queue resource: its name, roles and config schema.
#[derive(Debug, Clone)]
pub struct QueueResource {
    pub name: &'static str,
    pub kinds: Kinds,
    pub spec: &'static [FieldSpec],
}

impl Default for QueueResource {
    fn default() -> Self {
        Self {
            name: RESOURCE_NAME,
            kinds: Kinds::PRODUCER | Kinds::CONSUMER,
            spec: QUEUE_CONFIG_SPEC,
        }
    }
}

impl QueueResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the config, connects to the broker and returns the producer.
    pub async fn provide_producer<P: ConfigParser>(&self, parser: P) -> Result<Producer> {
        provide_producer_with(&AmqpConnector, parser).await
    }

    /// Resolves the config, connects to the broker and returns the consumer.
    pub async fn provide_consumer<P: ConfigParser>(&self, parser: P) -> Result<Consumer> {
        provide_consumer_with(&AmqpConnector, parser).await
    }
}

/// Plugin descriptor grouping the resources this crate offers.
#[derive(Debug, Clone)]
pub struct Plugin {
    pub name: &'static str,
    pub resources: Vec<QueueResource>,
}

pub fn plugin() -> Plugin {
    Plugin {
        name: PLUGIN_NAME,
        resources: vec![QueueResource::new()],
    }
}

async fn connect_with<C: Connector, P: ConfigParser>(
    connector: &C,
    parser: P,
) -> Result<(QueueConfig, C::Session)> {
    let config = parser.parse()?;
    let session = connector.connect(&config).await?;
    Ok((config, session))
}

/// Producer factory over any [`Connector`].
pub async fn provide_producer_with<C: Connector, P: ConfigParser>(
    connector: &C,
    parser: P,
) -> Result<Producer> {
    let (config, session) = connect_with(connector, parser).await?;
    info!(queue = %config.queue, chunk_size = config.chunk_size, stop_after = config.stop_after, "Producer ready");
    Ok(produce(config, session))
}

/// Consumer factory over any [`Connector`].
pub async fn provide_consumer_with<C: Connector, P: ConfigParser>(
    connector: &C,
    parser: P,
) -> Result<Consumer> {
    let (config, session) = connect_with(connector, parser).await?;
    info!(queue = %config.queue, content_type = %config.content_type, "Consumer ready");
    Ok(consume(config, session))
}
