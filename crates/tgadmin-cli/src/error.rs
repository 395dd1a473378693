//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A private command ran without a valid session.
    #[error("Not logged in. Run `tgadmin login` first.")]
    NotAuthenticated,

    #[error("{0}")]
    Invalid(String),

    /// A page failed to load; the message is the inline error.
    #[error("{0}")]
    Load(String),

    #[error("API error: {0}")]
    Api(#[from] tgadmin_api::ApiError),

    #[error("Realtime error: {0}")]
    Realtime(#[from] tgadmin_realtime::RealtimeError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] tgadmin_telemetry::TelemetryError),

    #[error(transparent)]
    Dashboard(#[from] tgadmin_dashboard::DashboardError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl AppError {
    /// Failures the user has already seen as a notification.
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::Dashboard(tgadmin_dashboard::DashboardError::Request(_)))
    }
}

pub type AppResult<T> = Result<T, AppError>;
