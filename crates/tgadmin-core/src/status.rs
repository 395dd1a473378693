//! Status enums and their display colors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display color for a status chip or notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Success,
    Info,
    Warning,
    Error,
    Neutral,
}

impl StatusColor {
    /// ANSI SGR color code used by the terminal renderer.
    pub fn ansi_code(&self) -> &'static str {
        match self {
            Self::Success => "32",
            Self::Info => "36",
            Self::Warning => "33",
            Self::Error => "31",
            Self::Neutral => "37",
        }
    }
}

/// Runtime status of a managed bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    Running,
    #[default]
    Stopped,
    Error,
    /// Any status string this client does not know about.
    #[serde(other)]
    Unknown,
}

impl BotStatus {
    pub fn color(&self) -> StatusColor {
        match self {
            Self::Running => StatusColor::Success,
            Self::Stopped => StatusColor::Neutral,
            Self::Error => StatusColor::Error,
            Self::Unknown => StatusColor::Warning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a wire status; unknown strings map to `Unknown`.
    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    #[default]
    Pending,
    Broadcasting,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl AdStatus {
    pub fn color(&self) -> StatusColor {
        match self {
            Self::Pending => StatusColor::Warning,
            Self::Broadcasting => StatusColor::Info,
            Self::Completed => StatusColor::Success,
            Self::Failed => StatusColor::Error,
            Self::Unknown => StatusColor::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Broadcasting => "broadcasting",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "broadcasting" => Self::Broadcasting,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Whether the advertisement still counts as active on the dashboard.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Broadcasting)
    }
}

impl fmt::Display for AdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn color(&self) -> StatusColor {
        match self {
            Self::Info => StatusColor::Info,
            Self::Success => StatusColor::Success,
            Self::Warning => StatusColor::Warning,
            Self::Error => StatusColor::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}
