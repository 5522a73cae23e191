// src/config.rs

pub mod cli;
pub mod queue;
pub mod schema;

pub use queue::{load_queue_config, parse_config_yaml, ConfigMap, QueueConfig};
pub use schema::{FieldDefault, FieldKind, FieldSpec, QUEUE_CONFIG_SPEC};

use crate::error::Result;

/// Something a factory can turn into a resolved [`QueueConfig`].
///
/// Hosts hand one of these to `provide_producer` / `provide_consumer`
/// instead of a finished config so resolution failures surface from the
/// factory call.
pub trait ConfigParser {
    fn parse(self) -> Result<QueueConfig>;
}

impl ConfigParser for QueueConfig {
    fn parse(self) -> Result<QueueConfig> {
        Ok(self)
    }
}

impl ConfigParser for ConfigMap {
    fn parse(self) -> Result<QueueConfig> {
        QueueConfig::from_map(&self)
    }
}

impl ConfigParser for &ConfigMap {
    fn parse(self) -> Result<QueueConfig> {
        QueueConfig::from_map(self)
    }
}
