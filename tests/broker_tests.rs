// tests/broker_tests.rs

mod common;

use amqp_queue::broker::disconnect;
use amqp_queue::error::{CloseTarget, QueueError};
use amqp_queue::reporting::{error_channel, ErrorReporter};
use common::{mock_session, Event, Failures};

#[tokio::test]
async fn test_disconnect_closes_channel_then_connection() {
    let (session, broker) = mock_session("q", Failures::default());
    let (tx, mut rx) = error_channel();
    let mut reporter = ErrorReporter::new(tx);

    disconnect(&session, &mut reporter).await;
    drop(reporter);

    assert_eq!(
        broker.events(),
        vec![Event::CloseChannel, Event::CloseConnection]
    );
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_disconnect_attempts_connection_after_channel_failure() {
    let failures = Failures {
        close_channel: true,
        ..Default::default()
    };
    let (session, broker) = mock_session("q", failures);
    let (tx, mut rx) = error_channel();
    let mut reporter = ErrorReporter::new(tx);

    disconnect(&session, &mut reporter).await;
    drop(reporter);

    assert_eq!(broker.close_counts(), (1, 1));
    assert_eq!(
        rx.recv().await,
        Some(QueueError::Disconnect {
            target: CloseTarget::Channel,
            reason: "channel already closed".to_string()
        })
    );
    assert_eq!(rx.recv().await, None);
}

#[cfg(test)]
mod rabbitmq_tests {
    use amqp_queue::config::QueueConfig;
    use amqp_queue::reporting::error_channel;
    use amqp_queue::resource::QueueResource;
    use testcontainers::{
        core::{IntoContainerPort, WaitFor},
        runners::AsyncRunner,
        ContainerAsync, GenericImage,
    };
    use tokio::sync::{mpsc, oneshot};
    use uuid::Uuid;

    // Helper function to start a RabbitMQ container
    async fn start_rabbitmq_container() -> (ContainerAsync<GenericImage>, String) {
        let image = GenericImage::new("rabbitmq", "3.13-management")
            .with_wait_for(WaitFor::message_on_stdout(
                "Server startup complete".to_string(),
            ))
            .with_exposed_port(5672.tcp());

        let container = image
            .start()
            .await
            .expect("Failed to start RabbitMQ container");

        let host_ip = container
            .get_host()
            .await
            .expect("Failed to get container host IP");
        let host_port = container
            .get_host_port_ipv4(5672)
            .await
            .expect("Failed to get mapped port");

        let amqp_addr = format!("amqp://guest:guest@{}:{}/%2f", host_ip, host_port);
        (container, amqp_addr)
    }

    #[ignore]
    #[tokio::test]
    async fn test_publish_then_drain_round_trip() {
        let (_container, amqp_addr) = start_rabbitmq_container().await;
        let config = QueueConfig {
            connection: amqp_addr,
            queue: format!("test_q_{}", Uuid::new_v4()),
            content_type: "text/plain".to_string(),
            stop_after: 3,
            chunk_size: 3,
            no_wait: false,
            auto_ack: false,
        };
        let resource = QueueResource::new();

        let consumer = resource
            .provide_consumer(config.clone())
            .await
            .expect("consumer setup failed");
        let (in_tx, in_rx) = mpsc::channel(8);
        let (err_tx, mut err_rx) = error_channel();
        let (done_tx, done_rx) = oneshot::channel();
        let worker = tokio::spawn(consumer(in_rx, err_tx, done_tx));
        for item in ["one", "two", "three"] {
            in_tx.send(item.as_bytes().to_vec()).await.unwrap();
        }
        drop(in_tx);
        done_rx.await.unwrap();
        worker.await.unwrap();
        assert_eq!(err_rx.recv().await, None);

        let producer = resource
            .provide_producer(config)
            .await
            .expect("producer setup failed");
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let (err_tx, mut err_rx) = error_channel();
        let worker = tokio::spawn(producer(out_tx, err_tx));

        let mut bodies = Vec::new();
        while let Some(body) = out_rx.recv().await {
            bodies.push(String::from_utf8(body).unwrap());
        }
        worker.await.unwrap();

        assert_eq!(bodies, vec!["one", "two", "three"]);
        assert_eq!(err_rx.recv().await, None);
    }
}
