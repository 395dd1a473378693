//! Real-time events to notifications.

use crate::notification::NotificationCenter;
use serde_json::Value;
use tgadmin_core::Severity;
use tgadmin_realtime::{Event, RealtimeClient, Subscription, Topic};
use tracing::debug;

/// Subscriptions feeding the notification center. Dropping the handle
/// leaves them registered; call [`BridgeHandle::detach`] to stop.
#[must_use = "keep the handle to detach the bridge later"]
#[derive(Debug)]
pub struct BridgeHandle {
    subscriptions: Vec<Subscription>,
}

impl BridgeHandle {
    pub fn detach(&self) {
        for sub in &self.subscriptions {
            sub.unsubscribe();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }
}

/// Map every notification-worthy topic onto `notifications`.
pub fn attach(client: &RealtimeClient, notifications: NotificationCenter) -> BridgeHandle {
    let topics = [
        Topic::ConnectionStatus,
        Topic::BotStatusChange,
        Topic::BroadcastStatusChange,
        Topic::Error,
    ];
    let subscriptions = topics
        .into_iter()
        .map(|topic| {
            let notifications = notifications.clone();
            client.subscribe(topic, move |event: &Event| {
                if let Some((message, severity)) = describe(event) {
                    notifications.show(message, severity);
                } else {
                    debug!(topic = %event.topic, "Event not shown");
                }
            })
        })
        .collect();
    BridgeHandle { subscriptions }
}

/// Notification text and severity for an event, if it should be shown.
pub fn describe(event: &Event) -> Option<(String, Severity)> {
    match &event.topic {
        Topic::ConnectionStatus => match event.str_field("status")? {
            "connected" => Some(("Connected to server".to_string(), Severity::Success)),
            "reconnecting" => Some(("Reconnecting to server...".to_string(), Severity::Warning)),
            "disconnected" => Some(("Disconnected from server".to_string(), Severity::Warning)),
            _ => None,
        },
        Topic::BotStatusChange => {
            let status = event.str_field("status").unwrap_or("unknown");
            let name = label(event, &["bot_name", "name"], "bot_id", "Bot");
            Some((format!("{name} is now {status}"), Severity::Info))
        }
        Topic::BroadcastStatusChange => {
            let status = event.str_field("status").unwrap_or("updated");
            let name = label(
                event,
                &["title"],
                if event.payload.get("ad_id").is_some() {
                    "ad_id"
                } else {
                    "advertisement_id"
                },
                "Advertisement",
            );
            let severity = match status {
                "completed" => Severity::Success,
                "failed" => Severity::Error,
                _ => Severity::Info,
            };
            Some((format!("Broadcast {status}: {name}"), severity))
        }
        Topic::Error => {
            let message = event
                .str_field("message")
                .or_else(|| event.str_field("error"))
                .unwrap_or("An unexpected error occurred");
            Some((message.to_string(), Severity::Error))
        }
        Topic::Other(_) => None,
    }
}

/// First present name field, else `"{kind} #{id}"`.
fn label(event: &Event, name_keys: &[&str], id_key: &str, kind: &str) -> String {
    if let Some(name) = name_keys.iter().find_map(|k| event.str_field(k)) {
        return name.to_string();
    }
    match event.payload.get(id_key) {
        Some(Value::Number(n)) => format!("{kind} #{n}"),
        Some(Value::String(s)) => format!("{kind} #{s}"),
        _ => kind.to_string(),
    }
}
