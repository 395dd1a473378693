//! Real-time wire frames and their normalisation onto topics.
//!
//! The server emits several frame shapes:
//! - `{"topic": "...", "payload": ...}`
//! - `{"type": "connection", "status": "connected"}`
//! - `{"type": "event", "event_type": "...", "data": ...}`
//! - `{"type": "notification", "notification_type": "...", "data": ...}`
//! - `{"type": "error", "message": "..."}`
//!
//! All of them become an [`Event`] tagged with a [`Topic`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tgadmin_core::BotId;

/// Named topic handlers subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    ConnectionStatus,
    BotStatusChange,
    BroadcastStatusChange,
    Error,
    Other(String),
}

impl Topic {
    /// Parse a wire name. Kebab-case and snake_case spellings are equivalent.
    pub fn from_wire(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "connection-status" | "connection" => Self::ConnectionStatus,
            "bot-status-change" | "bot-status" => Self::BotStatusChange,
            "broadcast-status-change" | "broadcast-status" => Self::BroadcastStatusChange,
            "error" | "generic-error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ConnectionStatus => "connection-status",
            Self::BotStatusChange => "bot-status-change",
            Self::BroadcastStatusChange => "broadcast-status-change",
            Self::Error => "error",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic-tagged payload delivered to handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub topic: Topic,
    pub payload: Value,
}

impl Event {
    pub fn new(topic: Topic, payload: Value) -> Self {
        Self { topic, payload }
    }

    pub fn connection_status(status: ConnectionStatus) -> Self {
        Self::new(
            Topic::ConnectionStatus,
            serde_json::json!({ "status": status.as_str() }),
        )
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            Topic::Error,
            serde_json::json!({ "message": message.into() }),
        )
    }

    /// String field of the payload.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    pub fn bot_id(&self) -> Option<BotId> {
        match self.payload.get("bot_id")? {
            Value::Number(n) => n.as_u64().map(BotId),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Connectivity status published on [`Topic::ConnectionStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Reconnecting,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Disconnected => "disconnected",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "connected" => Some(Self::Connected),
            "reconnecting" => Some(Self::Reconnecting),
            "disconnected" => Some(Self::Disconnected),
            _ => None,
        }
    }
}

/// Decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Event(Event),
    /// The server's own connection greeting.
    Greeting(String),
    /// Application-level pong.
    Pong,
    /// A frame with no topic.
    Unrecognized,
}

/// Decode a text frame.
pub fn parse_frame(text: &str) -> Result<Inbound, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    Ok(normalise(value))
}

fn normalise(mut value: Value) -> Inbound {
    let take = |value: &mut Value, key: &str| value.get_mut(key).map(Value::take);

    if let Some(topic) = value.get("topic").and_then(Value::as_str) {
        let topic = Topic::from_wire(topic);
        let payload = take(&mut value, "payload").unwrap_or(Value::Null);
        return Inbound::Event(Event::new(topic, payload));
    }

    let kind = match value.get("type").and_then(Value::as_str) {
        Some(kind) => kind.to_string(),
        None => return Inbound::Unrecognized,
    };

    match kind.as_str() {
        "connection" => {
            let status = value
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Inbound::Greeting(status)
        }
        "pong" => Inbound::Pong,
        "event" | "notification" => {
            let name_key = if kind == "event" {
                "event_type"
            } else {
                "notification_type"
            };
            match value.get(name_key).and_then(Value::as_str) {
                Some(name) => {
                    let topic = Topic::from_wire(name);
                    let payload = take(&mut value, "data").unwrap_or(Value::Null);
                    Inbound::Event(Event::new(topic, payload))
                }
                None => Inbound::Unrecognized,
            }
        }
        "error" => Inbound::Event(Event::new(Topic::Error, value)),
        other => Inbound::Event(Event::new(Topic::from_wire(other), value)),
    }
}

/// Frame sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    Subscribe { bot_id: BotId },
    Unsubscribe { bot_id: BotId },
}
