// src/utils/utils.rs

use crate::error::{QueueError, Result};
use axum::{http::StatusCode, routing::get, serve, Router};
use prometheus::{gather, Encoder, TextEncoder};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Renders every registered metric in the prometheus text format.
fn encode_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&gather(), &mut buffer)
        .map_err(|e| QueueError::Config(format!("Could not encode prometheus metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| QueueError::Config(format!("Prometheus metrics UTF-8 error: {}", e)))
}

async fn metrics_handler() -> (StatusCode, String) {
    match encode_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(error = %e, "Metrics scrape failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Serves `/metrics` on `0.0.0.0:<port>` in a background task.
pub async fn setup_prometheus_metrics(metrics_port: Option<u16>) -> Result<()> {
    let Some(port) = metrics_port else {
        info!("Prometheus metrics endpoint not configured (no port specified).");
        return Ok(());
    };

    let app = Router::new().route("/metrics", get(metrics_handler));
    let listener_addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&listener_addr).await.map_err(|e| {
        QueueError::Config(format!(
            "Failed to bind metrics server to {}: {}",
            listener_addr, e
        ))
    })?;
    info!(
        "Metrics endpoint will be available at http://{}/metrics",
        listener_addr
    );

    tokio::spawn(async move {
        if let Err(e) = serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });
    Ok(())
}
