//! Structured logging for tgadmin.
//!
//! Logs go to stderr so command output on stdout stays clean:
//! - JSON lines when `RUST_ENV=production` or `format = "json"`
//! - Human-readable output otherwise
//! - `RUST_LOG` overrides the configured level

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogFormat, TelemetryConfig};
