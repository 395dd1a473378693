//! Dashboard error types.
//!
//! Form validation errors display as the inline message shown next to the
//! form. `DashboardError` wraps them together with request failures that
//! have already been reported to the user.

use thiserror::Error;

/// Advertisement form validation, checked in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdFormError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Content is required")]
    ContentRequired,

    #[error("Price is required")]
    PriceRequired,

    #[error("Price must be a positive number")]
    InvalidPrice,

    #[error("Select at least one target bot")]
    NoTargetBots,

    #[error("Scheduled time must be in the future")]
    ScheduleInPast,
}

/// Media batch rejected before any upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("No files selected")]
    NoFiles,

    #[error("Maximum {max} files allowed")]
    TooManyFiles { max: usize },

    #[error("{name} exceeds the maximum size of {limit}")]
    FileTooLarge { name: String, limit: String },

    #[error("Selected files exceed the total size limit of {limit}")]
    TotalTooLarge { limit: String },

    #[error("{name}: unsupported file type {mime}")]
    UnsupportedType { name: String, mime: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotFormError {
    #[error("Bot name is required")]
    NameRequired,

    #[error("Bot token is required")]
    TokenRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileFormError {
    #[error("API key name is required")]
    KeyNameRequired,

    #[error("All password fields are required")]
    PasswordRequired,

    #[error("New passwords do not match")]
    PasswordMismatch,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The session is gone; the navigator is already on the login route.
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// A request failed; the message is what the user was shown.
    #[error("{0}")]
    Request(String),

    #[error(transparent)]
    AdForm(#[from] AdFormError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    BotForm(#[from] BotFormError),

    #[error(transparent)]
    ProfileForm(#[from] ProfileFormError),

    /// The action is disabled in the current state.
    #[error("{0}")]
    Busy(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The view was unmounted while the request was in flight.
    #[error("View is no longer mounted")]
    Unmounted,
}

impl DashboardError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Validation failures never reach the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::AdForm(_) | Self::Media(_) | Self::BotForm(_) | Self::ProfileForm(_)
        )
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
