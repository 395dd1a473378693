//! Mock real-time server for integration tests.
//!
//! Provides a WebSocket server that can:
//! - Check the `Authorization` header and refuse the handshake with 401
//! - Greet clients the way the real server does
//! - Record received frames and push frames to every client
//! - Drop all connections to exercise reconnects

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{accept_hdr_async, tungstenite::Message};

#[derive(Default)]
struct ServerState {
    accepted_token: Option<String>,
    connections: Mutex<u32>,
    auth_headers: Mutex<Vec<String>>,
    messages: Mutex<Vec<String>>,
    peers: Mutex<Vec<mpsc::UnboundedSender<Message>>>,
}

pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    state: Arc<ServerState>,
}

impl MockWsServer {
    /// Start a server that accepts any token.
    pub async fn start() -> Self {
        Self::start_with(None).await
    }

    /// Start a server that only accepts `Bearer <token>`.
    pub async fn requiring_token(token: &str) -> Self {
        Self::start_with(Some(token.to_string())).await
    }

    async fn start_with(accepted_token: Option<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(ServerState {
            accepted_token,
            ..Default::default()
        });
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let state_clone = state.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        tokio::spawn(handle_connection(stream, state_clone.clone()));
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            state,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Handshakes attempted, accepted or not.
    pub async fn connection_count(&self) -> u32 {
        *self.state.connections.lock().await
    }

    pub async fn auth_headers(&self) -> Vec<String> {
        self.state.auth_headers.lock().await.clone()
    }

    pub async fn received_messages(&self) -> Vec<String> {
        self.state.messages.lock().await.clone()
    }

    pub async fn peer_count(&self) -> usize {
        let mut peers = self.state.peers.lock().await;
        peers.retain(|tx| !tx.is_closed());
        peers.len()
    }

    /// Send a JSON frame to every connected client.
    pub async fn push(&self, frame: serde_json::Value) {
        let text = frame.to_string();
        for peer in self.state.peers.lock().await.iter() {
            let _ = peer.send(Message::Text(text.clone()));
        }
    }

    /// Close every connection with `code`.
    pub async fn close_all(&self, code: CloseCode, reason: &str) {
        let mut peers = self.state.peers.lock().await;
        for peer in peers.drain(..) {
            let _ = peer.send(Message::Close(Some(CloseFrame {
                code,
                reason: reason.to_string().into(),
            })));
        }
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(stream: TcpStream, state: Arc<ServerState>) {
    *state.connections.lock().await += 1;

    let captured: Arc<std::sync::Mutex<Option<String>>> = Arc::new(std::sync::Mutex::new(None));
    let captured_clone = captured.clone();
    let accepted = state.accepted_token.clone();

    let callback = move |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let header = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        *captured_clone.lock().unwrap() = Some(header.clone());

        match accepted {
            Some(token) if header != format!("Bearer {token}") => {
                let mut reject = ErrorResponse::new(Some("Unauthorized".to_string()));
                *reject.status_mut() = StatusCode::UNAUTHORIZED;
                Err(reject)
            }
            _ => Ok(response),
        }
    };

    let ws_stream = accept_hdr_async(stream, callback).await;
    let captured_header = captured.lock().unwrap().take();
    if let Some(header) = captured_header {
        state.auth_headers.lock().await.push(header);
    }
    let ws_stream = match ws_stream {
        Ok(ws) => ws,
        Err(_) => return,
    };

    let (mut write, mut read) = ws_stream.split();
    let greeting = serde_json::json!({
        "type": "connection",
        "status": "connected",
        "timestamp": "2024-05-01T10:00:00"
    });
    if write.send(Message::Text(greeting.to_string())).await.is_err() {
        return;
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    state.peers.lock().await.push(tx);

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => state.messages.lock().await.push(text),
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
            outbound = rx.recv() => match outbound {
                Some(msg @ Message::Close(_)) => {
                    let _ = write.send(msg).await;
                    break;
                }
                Some(msg) => {
                    if write.send(msg).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }
}
