// src/config/schema.rs

use serde_json::Value;

/// Value type a configuration field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    UnsignedInteger,
    Bool,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::UnsignedInteger => "unsigned integer",
            FieldKind::Bool => "boolean",
        }
    }
}

/// Default value of an optional field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Str(&'static str),
    Int(u64),
    Bool(bool),
}

impl FieldDefault {
    pub fn to_value(&self) -> Value {
        match self {
            FieldDefault::Str(s) => Value::from(*s),
            FieldDefault::Int(n) => Value::from(*n),
            FieldDefault::Bool(b) => Value::from(*b),
        }
    }
}

/// One entry of the queue resource's configuration schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub kind: FieldKind,
    pub default: Option<FieldDefault>,
}

pub const CONNECTION: &str = "connection";
pub const QUEUE: &str = "queue";
pub const CONTENT_TYPE: &str = "content-type";
pub const STOP_AFTER: &str = "stop-after";
pub const CHUNK_SIZE: &str = "chunk-size";
pub const NO_WAIT: &str = "no-wait";
pub const AUTO_ACK: &str = "auto-ack";

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

pub const QUEUE_CONFIG_SPEC: &[FieldSpec] = &[
    FieldSpec {
        name: CONNECTION,
        description: "AMQP broker connection string - amqp://{user}:{password}@{hostname}:{port}",
        required: true,
        kind: FieldKind::String,
        default: None,
    },
    FieldSpec {
        name: QUEUE,
        description: "Name of the queue to interact with",
        required: true,
        kind: FieldKind::String,
        default: None,
    },
    FieldSpec {
        name: CONTENT_TYPE,
        description: "Content type attached to published messages",
        required: false,
        kind: FieldKind::String,
        default: Some(FieldDefault::Str(DEFAULT_CONTENT_TYPE)),
    },
    FieldSpec {
        name: STOP_AFTER,
        description: "Stop producing after n messages, 0 for no limit",
        required: false,
        kind: FieldKind::Integer,
        default: Some(FieldDefault::Int(0)),
    },
    FieldSpec {
        name: CHUNK_SIZE,
        description: "Number of messages to receive from the queue before acknowledging",
        required: false,
        kind: FieldKind::UnsignedInteger,
        default: Some(FieldDefault::Int(1)),
    },
    FieldSpec {
        name: NO_WAIT,
        description: "Do not wait for the broker to confirm the consumer",
        required: false,
        kind: FieldKind::Bool,
        default: Some(FieldDefault::Bool(false)),
    },
    FieldSpec {
        name: AUTO_ACK,
        description: "Let the broker consider messages acknowledged on delivery",
        required: false,
        kind: FieldKind::Bool,
        default: Some(FieldDefault::Bool(false)),
    },
];

/// Looks up a field of the queue schema by its key.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    QUEUE_CONFIG_SPEC.iter().find(|spec| spec.name == name)
}
