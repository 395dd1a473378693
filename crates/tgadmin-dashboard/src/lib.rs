//! Dashboard layer for the Telegram bot admin client.
//!
//! Page view-models (dashboard, bots, advertising, analytics, profile) built
//! on the REST client and the real-time bridge, plus the notification center
//! and the route gate that every view shares through [`ViewContext`].

pub mod bridge;
pub mod config;
pub mod context;
pub mod error;
pub mod load_state;
pub mod notification;
pub mod router;
pub mod views;

pub use bridge::{attach as attach_realtime, describe as describe_event, BridgeHandle};
pub use config::{format_size, MediaLimits, NotificationConfig};
pub use context::ViewContext;
pub use error::{
    AdFormError, BotFormError, DashboardError, DashboardResult, MediaError, ProfileFormError,
};
pub use load_state::{LoadState, MountGuard};
pub use notification::{Notification, NotificationCenter, NotificationEvent, NotificationId};
pub use router::{Navigator, Route};
