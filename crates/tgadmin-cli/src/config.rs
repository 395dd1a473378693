//! Application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the TOML file
//! (`--config`, then `TGADMIN_CONFIG`, then `config/default.toml`), and
//! `TGADMIN__SECTION__KEY` environment variables.

use crate::error::{AppError, AppResult};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tgadmin_api::ApiConfig;
use tgadmin_dashboard::{MediaLimits, NotificationConfig};
use tgadmin_realtime::RealtimeConfig;
use tgadmin_telemetry::TelemetryConfig;
use tracing::{debug, warn};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "TGADMIN_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "TGADMIN";
const ENV_SEPARATOR: &str = "__";

/// Where the session token is kept between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

fn default_token_path() -> PathBuf {
    const APP_DIR: &str = "tgadmin";

    if let Some(dir) = dirs::config_dir() {
        return dir.join(APP_DIR).join("token");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(format!(".{APP_DIR}")).join("token");
    }
    PathBuf::from(format!(".{APP_DIR}")).join("token")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub media: MediaLimits,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load with the usual precedence. An explicitly named file must exist;
    /// the default path is optional.
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => (PathBuf::from(path), true),
                None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
            },
        };

        if !path.exists() {
            if required {
                return Err(AppError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "No config file, using defaults");
        }

        let config = Config::builder()
            .add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse a TOML document on its own, without files or environment.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let loaded: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Effective configuration as TOML.
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to render config: {e}")))
    }

    pub fn validate(&self) -> AppResult<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                self.api.base_url
            )));
        }
        if !self.realtime.url.starts_with("ws://") && !self.realtime.url.starts_with("wss://") {
            return Err(AppError::Config(format!(
                "realtime.url must be a ws(s) URL, got {:?}",
                self.realtime.url
            )));
        }
        if self.api.token_header.trim().is_empty() {
            return Err(AppError::Config("api.token_header must not be empty".into()));
        }
        if self.media.max_files == 0 {
            return Err(AppError::Config("media.max_files must be at least 1".into()));
        }
        if self.realtime.reconnect_base_delay_ms > self.realtime.reconnect_max_delay_ms {
            warn!(
                base = self.realtime.reconnect_base_delay_ms,
                max = self.realtime.reconnect_max_delay_ms,
                "Reconnect base delay exceeds the maximum; every retry waits the maximum"
            );
        }
        Ok(())
    }
}
