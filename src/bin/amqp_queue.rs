// src/bin/amqp_queue.rs

//! # amqp-queue
//!
//! Stand-alone host for the queue adapter. It plays the part of a pipeline
//! around one stream:
//!
//! - `drain` runs the producer role and writes every message body to stdout,
//!   one per line.
//! - `publish` runs the consumer role and publishes every stdin line.
//!
//! Logs go to stderr so stdout carries only message data.

use amqp_queue::config::cli::{Args, Command};
use amqp_queue::config::{load_queue_config, QueueConfig};
use amqp_queue::error::QueueError;
use amqp_queue::reporting::error_channel;
use amqp_queue::resource::QueueResource;
use amqp_queue::utils::setup_prometheus_metrics;
use anyhow::{bail, Context};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Logs every error coming out of a stream and returns how many were fatal.
fn spawn_error_drain(mut errors: mpsc::Receiver<QueueError>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut fatal = 0;
        while let Some(err) = errors.recv().await {
            error!(error = %err, fatal = err.is_fatal(), "Stream reported an error");
            if err.is_fatal() {
                fatal += 1;
            }
        }
        fatal
    })
}

async fn drain(resource: &QueueResource, config: QueueConfig, buffer: usize) -> anyhow::Result<()> {
    let producer = resource.provide_producer(config).await?;
    let (output_tx, mut output_rx) = mpsc::channel::<Vec<u8>>(buffer.max(1));
    let (errors_tx, errors_rx) = error_channel();

    let worker = tokio::spawn(producer(output_tx, errors_tx));
    let error_drain = spawn_error_drain(errors_rx);

    let mut stdout = tokio::io::stdout();
    let mut written = 0u64;
    while let Some(body) = output_rx.recv().await {
        stdout.write_all(&body).await?;
        stdout.write_all(b"\n").await?;
        written += 1;
    }
    stdout.flush().await?;

    worker.await.context("producer task panicked")?;
    let fatal = error_drain.await.context("error drain task panicked")?;
    info!(written, "Drain finished");
    if fatal > 0 {
        bail!("producer stopped after {} fatal error(s)", fatal);
    }
    Ok(())
}

async fn publish(resource: &QueueResource, config: QueueConfig, buffer: usize) -> anyhow::Result<()> {
    let consumer = resource.provide_consumer(config).await?;
    let (input_tx, input_rx) = mpsc::channel::<Vec<u8>>(buffer.max(1));
    let (errors_tx, errors_rx) = error_channel();
    let (done_tx, done_rx) = oneshot::channel();

    let worker = tokio::spawn(consumer(input_rx, errors_tx, done_tx));
    let error_drain = spawn_error_drain(errors_rx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sent = 0u64;
    while let Some(line) = lines.next_line().await? {
        if input_tx.send(line.into_bytes()).await.is_err() {
            bail!("consumer stopped accepting input");
        }
        sent += 1;
    }
    drop(input_tx);

    done_rx.await.context("consumer finished without signalling done")?;
    worker.await.context("consumer task panicked")?;
    error_drain.await.context("error drain task panicked")?;
    info!(sent, "Publish finished");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Loading queue configuration from: {}", args.config.display());
    let config = load_queue_config(&args.config)?;

    if args.validate_config {
        info!(queue = %config.queue, "Queue configuration is valid.");
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    setup_prometheus_metrics(args.metrics_port).await?;

    let resource = QueueResource::new();
    match args.command {
        Command::Drain { buffer } => drain(&resource, config, buffer).await,
        Command::Publish { buffer } => publish(&resource, config, buffer).await,
    }
}
