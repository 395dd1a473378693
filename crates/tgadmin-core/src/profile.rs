//! Account profile types: API keys, activity log, settings.

use crate::serde_helpers::flexible_time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API key metadata. The secret itself is only returned once, on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyInfo {
    pub id: u64,
    pub name: String,
    #[serde(default, with = "flexible_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "flexible_time")]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default, with = "flexible_time")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Freshly created API key including its secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedApiKey {
    pub key: String,
    pub key_id: u64,
    pub name: String,
    #[serde(default, with = "flexible_time")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Entry of the account activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: u64,
    pub action: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default, with = "flexible_time")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Page of the activity log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityPage {
    #[serde(default)]
    pub activities: Vec<ActivityEntry>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u64,
    #[serde(default)]
    pub current_page: u64,
}

/// Per-account preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub notification_preferences: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_layout: Option<serde_json::Value>,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            timezone: default_timezone(),
            language: default_language(),
            notification_preferences: serde_json::Map::new(),
            dashboard_layout: None,
        }
    }
}

impl UserSettings {
    /// Whether the given notification channel is enabled; missing keys count as enabled.
    pub fn notifies(&self, channel: &str) -> bool {
        self.notification_preferences
            .get(channel)
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }
}
