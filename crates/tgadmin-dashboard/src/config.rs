//! Dashboard configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Notification display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a notification stays visible.
    #[serde(default = "default_display_duration_ms")]
    pub display_duration_ms: u64,
}

fn default_display_duration_ms() -> u64 {
    6000
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_duration_ms: default_display_duration_ms(),
        }
    }
}

impl NotificationConfig {
    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.display_duration_ms)
    }
}

/// Media upload limits, checked before any file is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLimits {
    /// Maximum attachments per advertisement, already uploaded ones included.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Per-file size limit in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Size limit for one batch in bytes (None = unlimited).
    #[serde(default = "default_max_total_size")]
    pub max_total_size: Option<u64>,
}

fn default_max_files() -> usize {
    5
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_total_size() -> Option<u64> {
    Some(50 * 1024 * 1024)
}

impl Default for MediaLimits {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_size: default_max_file_size(),
            max_total_size: default_max_total_size(),
        }
    }
}

/// Human-readable byte size, e.g. `10MB`.
pub fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    const KIB: u64 = 1024;
    if bytes >= MIB {
        format!("{}MB", (bytes + MIB / 2) / MIB)
    } else if bytes >= KIB {
        format!("{}KB", (bytes + KIB / 2) / KIB)
    } else {
        format!("{bytes}B")
    }
}
