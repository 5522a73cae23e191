// Modules that form the library's public API
pub mod broker;
pub mod config;
pub mod error;
pub mod reporting;
pub mod resource;
pub mod utils;

pub mod consumer_logic;
pub mod producer_logic;

pub use broker::{Connector, Delivery, DeliveryStream, QueueSession};
pub use config::{ConfigMap, ConfigParser, QueueConfig};
pub use consumer_logic::{Consumer, ConsumerStream};
pub use error::{QueueError, Result};
pub use producer_logic::{Producer, ProducerStream};
pub use reporting::{error_channel, ErrorReporter};
pub use resource::{plugin, QueueResource};
