//! Records exchanged with the admin API.

use crate::decimal::Price;
use crate::error::CoreError;
use crate::serde_helpers::{flexible_time, null_as_default};
use crate::status::{AdStatus, BotStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|e| CoreError::InvalidId(format!("'{s}': {e}")))
            }
        }
    };
}

numeric_id!(
    /// Server-assigned user identifier.
    UserId
);
numeric_id!(
    /// Server-assigned bot identifier.
    BotId
);
numeric_id!(
    /// Server-assigned advertisement identifier.
    AdvertisementId
);

/// Authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, with = "flexible_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "flexible_time")]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Telegram bot managed through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bot {
    pub id: BotId,
    pub bot_name: String,
    /// Bot API credential. The server never echoes it back after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub status: BotStatus,
    #[serde(default, with = "flexible_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "flexible_time")]
    pub last_active: Option<DateTime<Utc>>,
}

impl Bot {
    pub fn is_running(&self) -> bool {
        self.status == BotStatus::Running
    }
}

/// Advertisement composed for broadcast to bot audiences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: AdvertisementId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub content: String,
    pub price: Price,
    #[serde(default, alias = "target_bot_ids", deserialize_with = "null_as_default")]
    pub target_bots: Vec<BotId>,
    #[serde(default, with = "flexible_time")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub status: AdStatus,
    #[serde(default, with = "flexible_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "flexible_time")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Advertisement {
    /// Title for list rendering; falls back to the first line of the content.
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            return &self.title;
        }
        self.content.lines().next().unwrap_or_default()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_for.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bot_from_api_payload() {
        let raw = r#"{
            "id": 7,
            "bot_name": "Bot1",
            "status": "stopped",
            "created_at": "2024-05-01T10:00:00.000001",
            "last_active": null
        }"#;
        let bot: Bot = serde_json::from_str(raw).unwrap();
        assert_eq!(bot.id, BotId(7));
        assert_eq!(bot.status, BotStatus::Stopped);
        assert!(bot.bot_token.is_none());
        assert!(bot.created_at.is_some());
        assert!(bot.last_active.is_none());
    }

    #[test]
    fn test_advertisement_from_sparse_payload() {
        // The API omits title/targets and may send null media.
        let raw = r#"{
            "id": 3,
            "content": "Spring sale\nAll week",
            "media_urls": null,
            "price": 12.5,
            "status": "pending",
            "created_at": "2024-05-01T10:00:00",
            "scheduled_for": null,
            "completed_at": null
        }"#;
        let ad: Advertisement = serde_json::from_str(raw).unwrap();
        assert_eq!(ad.id, AdvertisementId(3));
        assert_eq!(ad.price.inner(), dec!(12.5));
        assert!(ad.media_urls.is_empty());
        assert!(ad.target_bots.is_empty());
        assert_eq!(ad.display_title(), "Spring sale");
        assert!(!ad.is_scheduled());
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("42".parse::<BotId>().unwrap(), BotId(42));
        assert!("abc".parse::<BotId>().is_err());
    }

    #[test]
    fn test_user_admin_role() {
        let user: User = serde_json::from_str(r#"{"username":"root","role":"admin"}"#).unwrap();
        assert!(user.is_admin());
    }
}
