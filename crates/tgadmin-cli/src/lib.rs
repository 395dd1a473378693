//! `tgadmin`: terminal front end for the Telegram bot admin API.
//!
//! Wires configuration, logging, the REST session and the dashboard
//! view-models into one command per invocation, plus a `watch` mode that
//! streams real-time notifications.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use app::Application;
pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
