//! Real-time connection manager.
//!
//! Holds at most one live connection. `connect` and `disconnect` are
//! serialized; the connection runs on its own task, reconnects with
//! exponential backoff and restores bot subscriptions after every reconnect.

use crate::error::{RealtimeError, RealtimeResult};
use crate::heartbeat::Heartbeat;
use crate::message::{parse_frame, ClientFrame, ConnectionStatus, Event, Inbound, Topic};
use crate::subscription::{Subscription, TopicRegistry};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tgadmin_core::BotId;
use tokio::sync::{mpsc, Mutex as TokioMutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::connect_async;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default real-time endpoint.
pub const DEFAULT_REALTIME_URL: &str = "ws://localhost:51313/ws";

/// Close code the server uses for a missing or invalid token.
const CLOSE_POLICY_VIOLATION: u16 = 1008;

fn default_url() -> String {
    DEFAULT_REALTIME_URL.to_string()
}

fn default_reconnect_base_delay_ms() -> u64 {
    1000
}

fn default_reconnect_max_delay_ms() -> u64 {
    30_000
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_heartbeat_timeout_ms() -> u64 {
    10_000
}

/// Real-time connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// A ping must be answered within this.
    #[serde(default = "default_heartbeat_timeout_ms")]
    pub heartbeat_timeout_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_reconnect_attempts: 0,
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            heartbeat_timeout_ms: default_heartbeat_timeout_ms(),
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

struct Shared {
    config: RealtimeConfig,
    registry: TopicRegistry,
    state: RwLock<ConnectionState>,
    heartbeat: Heartbeat,
    bots: RwLock<BTreeSet<BotId>>,
    outbound: RwLock<Option<mpsc::Sender<ClientFrame>>>,
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        if previous != state {
            debug!(from = ?previous, to = ?state, "Connection state changed");
        }
    }

    fn emit(&self, event: Event) {
        self.registry.dispatch(&event);
    }

    fn emit_status(&self, status: ConnectionStatus) {
        self.emit(Event::connection_status(status));
    }
}

struct Live {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Real-time client. Clones share the same connection and handlers.
#[derive(Clone)]
pub struct RealtimeClient {
    shared: Arc<Shared>,
    live: Arc<TokioMutex<Option<Live>>>,
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("url", &self.shared.config.url)
            .field("state", &self.state())
            .finish()
    }
}

impl RealtimeClient {
    pub fn new(config: RealtimeConfig) -> Self {
        let heartbeat = Heartbeat::new(config.heartbeat_interval_ms, config.heartbeat_timeout_ms);
        Self {
            shared: Arc::new(Shared {
                config,
                registry: TopicRegistry::new(),
                state: RwLock::new(ConnectionState::Disconnected),
                heartbeat,
                bots: RwLock::new(BTreeSet::new()),
                outbound: RwLock::new(None),
            }),
            live: Arc::new(TokioMutex::new(None)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.read()
    }

    pub fn registry(&self) -> &TopicRegistry {
        &self.shared.registry
    }

    /// Register a handler for `topic`.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.shared.registry.subscribe(topic, handler)
    }

    /// Open the connection with the session token.
    ///
    /// Returns once the connection task is running. A no-op while a
    /// connection task is already live.
    pub async fn connect(&self, token: &str) -> RealtimeResult<()> {
        if token.trim().is_empty() {
            return Err(RealtimeError::Rejected("missing session token".to_string()));
        }
        // Fail fast on a malformed URL or token before spawning.
        build_request(&self.shared.config.url, token)?;

        let mut live = self.live.lock().await;
        if let Some(current) = live.as_ref() {
            if !current.task.is_finished() {
                debug!("Real-time connection already live");
                return Ok(());
            }
        }

        let cancel = CancellationToken::new();
        let (outbound_tx, outbound_rx) = mpsc::channel(64);
        *self.shared.outbound.write() = Some(outbound_tx);
        self.shared.set_state(ConnectionState::Connecting);

        let task = tokio::spawn(run(
            self.shared.clone(),
            token.to_string(),
            cancel.clone(),
            outbound_rx,
        ));
        *live = Some(Live { cancel, task });
        Ok(())
    }

    /// Close the connection, emit a final `disconnected` status and drop
    /// every handler and bot subscription.
    pub async fn disconnect(&self) {
        let mut live = self.live.lock().await;
        let was_live = match live.take() {
            Some(current) => {
                current.cancel.cancel();
                if let Err(e) = current.task.await {
                    warn!(error = %e, "Real-time task ended abnormally");
                }
                true
            }
            None => false,
        };

        *self.shared.outbound.write() = None;
        self.shared.set_state(ConnectionState::Disconnected);
        if was_live {
            info!("Real-time connection closed");
            self.shared.emit_status(ConnectionStatus::Disconnected);
        }
        self.shared.bots.write().clear();
        self.shared.registry.clear();
    }

    /// Follow events of one bot. Remembered and re-sent after reconnect.
    pub fn subscribe_bot(&self, bot_id: BotId) -> RealtimeResult<()> {
        if self.shared.bots.write().insert(bot_id) {
            self.send_frame(ClientFrame::Subscribe { bot_id })?;
        }
        Ok(())
    }

    pub fn unsubscribe_bot(&self, bot_id: BotId) -> RealtimeResult<()> {
        if self.shared.bots.write().remove(&bot_id) {
            self.send_frame(ClientFrame::Unsubscribe { bot_id })?;
        }
        Ok(())
    }

    pub fn bot_subscriptions(&self) -> Vec<BotId> {
        self.shared.bots.read().iter().copied().collect()
    }

    /// Send now when connected. Otherwise the frame is covered by the
    /// subscription restore on the next connect.
    fn send_frame(&self, frame: ClientFrame) -> RealtimeResult<()> {
        if self.state() != ConnectionState::Connected {
            return Ok(());
        }
        match self.shared.outbound.read().as_ref() {
            Some(tx) => tx
                .try_send(frame)
                .map_err(|e| RealtimeError::SendFailed(e.to_string())),
            None => Err(RealtimeError::NotConnected),
        }
    }
}

async fn run(
    shared: Arc<Shared>,
    token: String,
    cancel: CancellationToken,
    mut outbound_rx: mpsc::Receiver<ClientFrame>,
) {
    let mut attempt = 0u32;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        shared.set_state(ConnectionState::Connecting);

        match try_connect(&shared, &token, &cancel, &mut outbound_rx, &mut attempt).await {
            Ok(()) => {
                info!("Real-time connection ended");
            }
            Err(e) if !e.is_retryable() => {
                error!(error = %e, "Real-time connection rejected, not reconnecting");
                shared.set_state(ConnectionState::Disconnected);
                shared.emit(Event::error(e.to_string()));
                shared.emit_status(ConnectionStatus::Disconnected);
                return;
            }
            Err(e) => {
                warn!(error = %e, "Real-time connection error");
            }
        }

        if cancel.is_cancelled() {
            break;
        }

        attempt += 1;
        let max = shared.config.max_reconnect_attempts;
        if max > 0 && attempt > max {
            error!(attempt, "Max reconnection attempts reached");
            shared.set_state(ConnectionState::Disconnected);
            shared.emit(Event::error("Max reconnection attempts reached"));
            shared.emit_status(ConnectionStatus::Disconnected);
            return;
        }

        shared.set_state(ConnectionState::Reconnecting);
        shared.emit_status(ConnectionStatus::Reconnecting);

        let delay = backoff_delay(&shared.config, attempt);
        warn!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting");

        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = cancel.cancelled() => {
                info!("Shutdown requested during backoff");
                break;
            }
        }
    }

    shared.set_state(ConnectionState::Disconnected);
}

async fn try_connect(
    shared: &Shared,
    token: &str,
    cancel: &CancellationToken,
    outbound_rx: &mut mpsc::Receiver<ClientFrame>,
    attempt: &mut u32,
) -> RealtimeResult<()> {
    info!(url = %shared.config.url, "Connecting to real-time server");

    let request = build_request(&shared.config.url, token)?;
    let (ws_stream, _response) = tokio::select! {
        result = connect_async(request) => result.map_err(classify_handshake_error)?,
        () = cancel.cancelled() => return Ok(()),
    };
    let (mut write, mut read) = ws_stream.split();

    // Frames queued while offline are superseded by the restore below.
    while outbound_rx.try_recv().is_ok() {}

    shared.set_state(ConnectionState::Connected);
    *attempt = 0;
    shared.heartbeat.reset();
    info!("Real-time connection established");
    shared.emit_status(ConnectionStatus::Connected);

    let bots: Vec<BotId> = shared.bots.read().iter().copied().collect();
    if !bots.is_empty() {
        info!(count = bots.len(), "Restoring bot subscriptions");
    }
    for bot_id in bots {
        let text = serde_json::to_string(&ClientFrame::Subscribe { bot_id })?;
        write.send(Message::Text(text)).await?;
    }

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    warn!(error = %e, "Failed to send close frame");
                }
                return Ok(());
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => handle_text(shared, &text),
                    Some(Ok(Message::Ping(data))) => {
                        shared.heartbeat.record_message();
                        write.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(Message::Pong(_))) => shared.heartbeat.record_pong(),
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.to_string()))
                            .unwrap_or((1000, "Normal close".to_string()));
                        warn!(code, %reason, "Connection closed by server");
                        if code == CLOSE_POLICY_VIOLATION {
                            return Err(RealtimeError::Rejected(reason));
                        }
                        return Err(RealtimeError::ConnectionClosed { code, reason });
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        warn!("Real-time stream ended");
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                }
            }

            Some(frame) = outbound_rx.recv() => {
                let text = serde_json::to_string(&frame)?;
                write.send(Message::Text(text)).await?;
                debug!(?frame, "Frame sent");
            }

            () = tokio::time::sleep(shared.heartbeat.check_period()) => {
                if shared.heartbeat.is_timed_out() {
                    return Err(RealtimeError::HeartbeatTimeout);
                }
                if shared.heartbeat.should_ping() {
                    write.send(Message::Ping(Vec::new())).await?;
                    shared.heartbeat.record_ping();
                    debug!("Sent heartbeat ping");
                }
            }
        }
    }
}

fn handle_text(shared: &Shared, text: &str) {
    shared.heartbeat.record_message();

    match parse_frame(text) {
        Ok(Inbound::Event(event)) => {
            let handlers = shared.registry.dispatch(&event);
            debug!(topic = %event.topic, handlers, "Event dispatched");
        }
        Ok(Inbound::Greeting(status)) => debug!(%status, "Server greeting"),
        Ok(Inbound::Pong) => shared.heartbeat.record_pong(),
        Ok(Inbound::Unrecognized) => debug!("Ignoring frame without topic"),
        Err(e) => warn!(error = %e, "Malformed real-time frame"),
    }
}

fn build_request(url: &str, token: &str) -> RealtimeResult<Request> {
    let mut request = url.into_client_request()?;
    let value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| RealtimeError::ConnectionFailed(format!("Invalid token: {e}")))?;
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(request)
}

fn classify_handshake_error(e: tungstenite::Error) -> RealtimeError {
    match e {
        tungstenite::Error::Http(response)
            if matches!(
                response.status(),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            ) =>
        {
            RealtimeError::Rejected(format!("HTTP {}", response.status()))
        }
        other => other.into(),
    }
}

/// Exponential backoff: `base * 2^(attempt-1)` capped at the max, plus jitter.
fn backoff_delay(config: &RealtimeConfig, attempt: u32) -> Duration {
    let base = config.reconnect_base_delay_ms;
    let exponent = attempt.saturating_sub(1).min(10);
    let delay = base
        .saturating_mul(1u64 << exponent)
        .min(config.reconnect_max_delay_ms);
    Duration::from_millis(delay + jitter(base.min(1000)))
}

/// Jitter in `0..=bound` ms.
fn jitter(bound: u64) -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos) % (bound + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: u64, max: u64) -> RealtimeConfig {
        RealtimeConfig {
            reconnect_base_delay_ms: base,
            reconnect_max_delay_ms: max,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = RealtimeConfig::default();
        assert_eq!(config.max_reconnect_attempts, 0);
        assert_eq!(config.heartbeat_interval_ms, 30_000);
        assert_eq!(config.url, DEFAULT_REALTIME_URL);
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let cfg = config(100, 1_000);
        let within = |attempt: u32, expected: u64| {
            let ms = backoff_delay(&cfg, attempt).as_millis() as u64;
            assert!(
                (expected..=expected + 100).contains(&ms),
                "attempt {attempt}: {ms}ms not in {expected}..={}",
                expected + 100
            );
        };
        within(1, 100);
        within(2, 200);
        within(3, 400);
        within(5, 1_000);
        within(30, 1_000);
    }

    #[test]
    fn test_build_request_sets_bearer() {
        let request = build_request("ws://localhost:51313/ws", "jwt-1").unwrap();
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer jwt-1"
        );
    }

    #[test]
    fn test_build_request_rejects_bad_url() {
        assert!(build_request("not a url", "t").is_err());
    }

    #[tokio::test]
    async fn test_connect_requires_token() {
        let client = RealtimeClient::new(RealtimeConfig::default());
        let err = client.connect("  ").await.unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_bot_subscriptions_tracked_offline() {
        let client = RealtimeClient::new(RealtimeConfig::default());
        client.subscribe_bot(BotId(2)).unwrap();
        client.subscribe_bot(BotId(1)).unwrap();
        client.subscribe_bot(BotId(2)).unwrap();
        assert_eq!(client.bot_subscriptions(), vec![BotId(1), BotId(2)]);

        client.unsubscribe_bot(BotId(1)).unwrap();
        assert_eq!(client.bot_subscriptions(), vec![BotId(2)]);
    }

    #[tokio::test]
    async fn test_disconnect_when_idle_clears_handlers() {
        let client = RealtimeClient::new(RealtimeConfig::default());
        let _sub = client.subscribe(Topic::Error, |_| {});
        client.disconnect().await;
        assert_eq!(client.registry().handler_count(&Topic::Error), 0);
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }
}
