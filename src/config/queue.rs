// src/config/queue.rs

use crate::config::schema::{self, field_spec, FieldKind};
use crate::error::{QueueError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Generic key-value form of a resource configuration, as handed over by a host.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Resolved configuration of one queue stream instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueueConfig {
    pub connection: String,
    pub queue: String,
    pub content_type: String,
    /// Number of messages after which a producer stops; 0 means never.
    pub stop_after: u64,
    /// Deliveries collected before acknowledging. Always at least 1.
    pub chunk_size: usize,
    pub no_wait: bool,
    pub auto_ack: bool,
}

impl QueueConfig {
    /// Resolves a configuration map against the queue schema.
    pub fn from_map(map: &ConfigMap) -> Result<Self> {
        for key in map.keys() {
            if field_spec(key).is_none() {
                warn!(field = %key, "Ignoring unknown queue config field");
            }
        }

        let connection = required_string(map, schema::CONNECTION)?;
        let queue = required_string(map, schema::QUEUE)?;
        let content_type = optional_string(map, schema::CONTENT_TYPE)?;
        let stop_after = optional_u64(map, schema::STOP_AFTER)?;
        let chunk_size = optional_u64(map, schema::CHUNK_SIZE)?;
        let no_wait = optional_bool(map, schema::NO_WAIT)?;
        let auto_ack = optional_bool(map, schema::AUTO_ACK)?;

        if chunk_size == 0 {
            return Err(QueueError::validation(
                schema::CHUNK_SIZE,
                "must be greater than 0",
            ));
        }
        let chunk_size = usize::try_from(chunk_size)
            .map_err(|_| QueueError::validation(schema::CHUNK_SIZE, "value is too large"))?;

        let config = QueueConfig {
            connection,
            queue,
            content_type,
            stop_after,
            chunk_size,
            no_wait,
            auto_ack,
        };
        debug!(queue = %config.queue, chunk_size = config.chunk_size, stop_after = config.stop_after, "Resolved queue config");
        Ok(config)
    }

    /// Renders the resolved config with its schema keys, in the same YAML
    /// form `load_queue_config` reads.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| QueueError::Config(format!("Failed to render queue config: {}", e)))
    }
}

/// Parses a YAML document into a configuration map.
pub fn parse_config_yaml(content: &str) -> Result<ConfigMap> {
    let map: ConfigMap = serde_yaml::from_str(content)?;
    Ok(map)
}

/// Loads and resolves a queue configuration from a YAML file.
pub fn load_queue_config<P: AsRef<Path>>(path: P) -> Result<QueueConfig> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref).map_err(|e| {
        QueueError::Config(format!(
            "Failed to read queue config file '{}': {}",
            path_ref.display(),
            e
        ))
    })?;
    let map = parse_config_yaml(&content)?;
    QueueConfig::from_map(&map)
}

fn lookup<'a>(map: &'a ConfigMap, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

fn default_value(field: &str) -> Value {
    field_spec(field)
        .and_then(|spec| spec.default)
        .map(|d| d.to_value())
        .unwrap_or(Value::Null)
}

fn type_error(field: &str, found: &Value) -> QueueError {
    let expected = field_spec(field)
        .map(|spec| spec.kind)
        .unwrap_or(FieldKind::String);
    QueueError::validation(field, format!("expected {}, found {}", expected.name(), found))
}

fn required_string(map: &ConfigMap, field: &str) -> Result<String> {
    match lookup(map, field) {
        None => Err(QueueError::validation(field, "missing required field")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(QueueError::validation(field, "must not be empty"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(type_error(field, other)),
    }
}

fn optional_string(map: &ConfigMap, field: &str) -> Result<String> {
    let value = lookup(map, field).cloned().unwrap_or_else(|| default_value(field));
    match value {
        Value::String(s) => Ok(s),
        other => Err(type_error(field, &other)),
    }
}

fn optional_u64(map: &ConfigMap, field: &str) -> Result<u64> {
    let value = lookup(map, field).cloned().unwrap_or_else(|| default_value(field));
    match &value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else if n.as_i64().is_some() {
                Err(QueueError::validation(field, "must not be negative"))
            } else {
                Err(type_error(field, &value))
            }
        }
        other => Err(type_error(field, other)),
    }
}

fn optional_bool(map: &ConfigMap, field: &str) -> Result<bool> {
    let value = lookup(map, field).cloned().unwrap_or_else(|| default_value(field));
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(type_error(field, &other)),
    }
}
