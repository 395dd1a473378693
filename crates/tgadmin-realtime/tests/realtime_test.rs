//! Real-time client lifecycle tests.
//!
//! Covers:
//! - Handshake authentication and connectivity status events
//! - Topic fan-out and unsubscription
//! - Reconnection with bot subscription restore
//! - Rejected handshakes and disconnect teardown

mod common;
use common::mock_ws::MockWsServer;

use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tgadmin_core::BotId;
use tgadmin_realtime::{ConnectionState, Event, RealtimeClient, RealtimeConfig, Topic};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

fn config(url: String) -> RealtimeConfig {
    RealtimeConfig {
        url,
        reconnect_base_delay_ms: 20,
        reconnect_max_delay_ms: 100,
        ..Default::default()
    }
}

type Log = Arc<Mutex<Vec<String>>>;

/// Record `status` fields of connection-status events.
fn record_statuses(client: &RealtimeClient) -> Log {
    let log: Log = Arc::default();
    let sink = log.clone();
    let _sub = client.subscribe(Topic::ConnectionStatus, move |event: &Event| {
        sink.lock()
            .push(event.str_field("status").unwrap_or_default().to_string());
    });
    log
}

async fn eventually<F: Fn() -> bool>(what: &str, check: F) {
    let result = timeout(Duration::from_secs(3), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(result.is_ok(), "timed out waiting for {what}");
}

async fn eventually_async<F, Fut>(what: &str, check: F)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let result = timeout(Duration::from_secs(3), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(result.is_ok(), "timed out waiting for {what}");
}

#[tokio::test]
async fn test_connects_with_bearer_token() {
    let server = MockWsServer::requiring_token("jwt-1").await;
    let client = RealtimeClient::new(config(server.url()));
    let statuses = record_statuses(&client);

    client.connect("jwt-1").await.unwrap();
    eventually("connected status", || statuses.lock().contains(&"connected".to_string())).await;

    assert_eq!(client.state(), ConnectionState::Connected);
    // The server greeting does not produce a second status event.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*statuses.lock(), vec!["connected"]);
    assert_eq!(server.auth_headers().await, vec!["Bearer jwt-1".to_string()]);

    client.disconnect().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_second_connect_is_noop() {
    let server = MockWsServer::start().await;
    let client = RealtimeClient::new(config(server.url()));

    client.connect("t").await.unwrap();
    client.connect("t").await.unwrap();
    eventually_async("one peer", || async { server.peer_count().await == 1 }).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(server.connection_count().await, 1);
    client.disconnect().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_events_fan_out_in_order() {
    let server = MockWsServer::start().await;
    let client = RealtimeClient::new(config(server.url()));
    let log: Log = Arc::default();

    let first = {
        let log = log.clone();
        client.subscribe(Topic::BotStatusChange, move |e: &Event| {
            log.lock().push(format!("first:{}", e.str_field("status").unwrap_or("?")));
        })
    };
    let _second = {
        let log = log.clone();
        client.subscribe(Topic::BotStatusChange, move |e: &Event| {
            log.lock().push(format!("second:{}", e.str_field("status").unwrap_or("?")));
        })
    };

    client.connect("t").await.unwrap();
    eventually_async("peer", || async { server.peer_count().await == 1 }).await;

    server
        .push(json!({"type": "event", "event_type": "bot_status_change", "data": {"bot_id": 1, "status": "running"}}))
        .await;
    eventually("two deliveries", || log.lock().len() == 2).await;
    assert_eq!(*log.lock(), vec!["first:running", "second:running"]);

    first.unsubscribe();
    first.unsubscribe();
    server
        .push(json!({"topic": "bot-status-change", "payload": {"bot_id": 1, "status": "stopped"}}))
        .await;
    eventually("third delivery", || log.lock().len() == 3).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        *log.lock(),
        vec!["first:running", "second:running", "second:stopped"]
    );

    client.disconnect().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_reconnect_restores_bot_subscriptions() {
    let server = MockWsServer::start().await;
    let client = RealtimeClient::new(config(server.url()));
    let statuses = record_statuses(&client);

    client.connect("t").await.unwrap();
    eventually_async("peer", || async { server.peer_count().await == 1 }).await;
    eventually("connected", || client.state() == ConnectionState::Connected).await;

    client.subscribe_bot(BotId(7)).unwrap();
    eventually_async("subscribe frame", || async {
        server.received_messages().await.len() == 1
    })
    .await;

    server.close_all(CloseCode::Away, "restart").await;
    eventually_async("second connection", || async {
        server.connection_count().await == 2
    })
    .await;
    eventually_async("subscribe re-sent", || async {
        server.received_messages().await.len() == 2
    })
    .await;

    let frames: Vec<serde_json::Value> = server
        .received_messages()
        .await
        .iter()
        .map(|m| serde_json::from_str(m).unwrap())
        .collect();
    assert!(frames
        .iter()
        .all(|f| *f == json!({"type": "subscribe", "bot_id": 7})));

    eventually("reconnected", || client.state() == ConnectionState::Connected).await;
    let seen = statuses.lock().clone();
    assert_eq!(seen.first().map(String::as_str), Some("connected"));
    assert!(seen.contains(&"reconnecting".to_string()));
    assert_eq!(seen.last().map(String::as_str), Some("connected"));

    client.disconnect().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_rejected_handshake_is_not_retried() {
    let server = MockWsServer::requiring_token("good").await;
    let client = RealtimeClient::new(config(server.url()));
    let statuses = record_statuses(&client);
    let errors: Log = Arc::default();
    let _errors_sub = {
        let errors = errors.clone();
        client.subscribe(Topic::Error, move |e: &Event| {
            errors
                .lock()
                .push(e.str_field("message").unwrap_or_default().to_string());
        })
    };

    client.connect("bad").await.unwrap();
    eventually("disconnected", || statuses.lock().contains(&"disconnected".to_string())).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(server.connection_count().await, 1);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(errors.lock().len(), 1);
    assert!(errors.lock()[0].contains("401"));
    server.shutdown().await;
}

#[tokio::test]
async fn test_policy_close_is_not_retried() {
    let server = MockWsServer::start().await;
    let client = RealtimeClient::new(config(server.url()));
    let statuses = record_statuses(&client);

    client.connect("t").await.unwrap();
    eventually_async("peer", || async { server.peer_count().await == 1 }).await;
    server
        .close_all(CloseCode::Policy, "Invalid authentication token")
        .await;

    eventually("disconnected", || statuses.lock().contains(&"disconnected".to_string())).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.connection_count().await, 1);
    server.shutdown().await;
}

#[tokio::test]
async fn test_max_reconnect_attempts() {
    // Nothing listens on the discard port.
    let client = RealtimeClient::new(RealtimeConfig {
        max_reconnect_attempts: 2,
        ..config("ws://127.0.0.1:9/ws".to_string())
    });
    let statuses = record_statuses(&client);

    client.connect("t").await.unwrap();
    eventually("gave up", || statuses.lock().contains(&"disconnected".to_string())).await;

    let reconnecting = statuses
        .lock()
        .iter()
        .filter(|s| s.as_str() == "reconnecting")
        .count();
    assert_eq!(reconnecting, 2);
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_disconnect_emits_final_status_then_clears_handlers() {
    let server = MockWsServer::start().await;
    let client = RealtimeClient::new(config(server.url()));
    let statuses = record_statuses(&client);

    client.connect("t").await.unwrap();
    eventually("connected", || client.state() == ConnectionState::Connected).await;

    client.disconnect().await;
    assert_eq!(statuses.lock().last().map(String::as_str), Some("disconnected"));
    assert_eq!(client.registry().handler_count(&Topic::ConnectionStatus), 0);
    assert_eq!(client.state(), ConnectionState::Disconnected);

    // A new connection starts with no handlers.
    client.connect("t").await.unwrap();
    eventually("connected again", || client.state() == ConnectionState::Connected).await;
    let before = statuses.lock().len();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(statuses.lock().len(), before);

    client.disconnect().await;
    server.shutdown().await;
}
