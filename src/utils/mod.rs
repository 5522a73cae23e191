// Utils

pub mod common;
pub mod prometheus_metrics;
#[allow(clippy::module_inception)]
pub mod utils;

pub use common::{AmqpConnector, AmqpSession};
pub use utils::setup_prometheus_metrics;
