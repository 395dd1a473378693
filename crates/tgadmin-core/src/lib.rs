//! Core domain types for the Telegram bot administration client.
//!
//! This crate provides the types shared by every other crate:
//! - `Bot`, `Advertisement`, `User`: records exchanged with the admin API
//! - `Price`: precision-safe advertisement price
//! - `BotStatus`, `AdStatus`, `Severity`: status enums with display colors
//! - `MediaAttachment`, `MediaKind`: uploaded media references

pub mod analytics;
pub mod decimal;
pub mod error;
pub mod media;
pub mod profile;
pub mod serde_helpers;
pub mod status;
pub mod types;

pub use analytics::{DashboardMetrics, ExportRow, MetricRecord};
pub use decimal::Price;
pub use error::{CoreError, Result};
pub use media::{MediaAttachment, MediaKind};
pub use profile::{ActivityEntry, ActivityPage, ApiKeyInfo, CreatedApiKey, UserSettings};
pub use status::{AdStatus, BotStatus, Severity, StatusColor};
pub use types::{Advertisement, AdvertisementId, Bot, BotId, User, UserId};
