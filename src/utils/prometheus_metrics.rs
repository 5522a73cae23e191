// src/utils/prometheus_metrics.rs

use once_cell::sync::Lazy;
use prometheus::{register_counter, register_gauge, register_histogram, Counter, Gauge, Histogram};

// Producer stream
pub static MESSAGES_FORWARDED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "amqp_queue_messages_forwarded_total",
        "Total number of message bodies forwarded to the pipeline."
    )
    .expect("Failed to register MESSAGES_FORWARDED_TOTAL counter")
});

pub static CHUNKS_ACKED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "amqp_queue_chunks_acked_total",
        "Total number of chunks acknowledged with a cumulative ack."
    )
    .expect("Failed to register CHUNKS_ACKED_TOTAL counter")
});

pub static ACK_ERRORS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "amqp_queue_ack_errors_total",
        "Total number of failed chunk acknowledgments."
    )
    .expect("Failed to register ACK_ERRORS_TOTAL counter")
});

pub static RECEIVE_ERRORS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "amqp_queue_receive_errors_total",
        "Total number of delivery stream failures, including consume setup."
    )
    .expect("Failed to register RECEIVE_ERRORS_TOTAL counter")
});

// Consumer stream
pub static MESSAGES_PUBLISHED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "amqp_queue_messages_published_total",
        "Total number of pipeline items published to the queue."
    )
    .expect("Failed to register MESSAGES_PUBLISHED_TOTAL counter")
});

pub static PUBLISH_ERRORS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "amqp_queue_publish_errors_total",
        "Total number of failed publishes."
    )
    .expect("Failed to register PUBLISH_ERRORS_TOTAL counter")
});

pub static PUBLISH_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "amqp_queue_publish_duration_seconds",
        "Histogram of publish call latencies."
    )
    .expect("Failed to register PUBLISH_DURATION_SECONDS histogram")
});

// Both
pub static DISCONNECT_ERRORS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "amqp_queue_disconnect_errors_total",
        "Total number of failed channel or connection closes."
    )
    .expect("Failed to register DISCONNECT_ERRORS_TOTAL counter")
});

pub static ACTIVE_STREAMS: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "amqp_queue_active_streams",
        "Number of producer and consumer streams currently running."
    )
    .expect("Failed to register ACTIVE_STREAMS gauge")
});
