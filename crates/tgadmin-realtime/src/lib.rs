//! Real-time notification bridge for the Telegram bot admin API.
//!
//! Provides a WebSocket client with:
//! - One live connection per client, `connect`/`disconnect` serialized
//! - Automatic reconnection with exponential backoff and jitter
//! - Heartbeat monitoring (ping when idle, pong timeout detection)
//! - Named-topic subscription with per-topic handler fan-out
//! - Bot subscriptions restored after reconnect

pub mod connection;
pub mod error;
pub mod heartbeat;
pub mod message;
pub mod subscription;

pub use connection::{ConnectionState, RealtimeClient, RealtimeConfig, DEFAULT_REALTIME_URL};
pub use error::{RealtimeError, RealtimeResult};
pub use message::{ClientFrame, ConnectionStatus, Event, Inbound, Topic};
pub use subscription::{Subscription, TopicRegistry};
