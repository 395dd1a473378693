//! Application wiring.
//!
//! Builds the REST client, session, notification center and view context
//! from [`AppConfig`], gates private commands on the session, and runs one
//! command.

use crate::cli::Command;
use crate::commands;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::output;
use std::sync::Arc;
use tgadmin_api::{ApiClient, FileTokenStore, Session};
use tgadmin_core::User;
use tgadmin_dashboard::{NotificationCenter, Route, ViewContext};
use tracing::{debug, info};

pub struct Application {
    config: AppConfig,
    ctx: ViewContext,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let tokens = Arc::new(FileTokenStore::new(config.session.token_path.clone()));
        let api = ApiClient::new(config.api.clone(), tokens)?;
        let notifications = NotificationCenter::new(&config.notifications);
        let ctx = ViewContext::new(Session::new(api), notifications);
        debug!(base_url = %config.api.base_url, "Application initialized");
        Ok(Self { config, ctx })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn ctx(&self) -> &ViewContext {
        &self.ctx
    }

    /// Run one command. Private commands restore the session first.
    pub async fn run(&self, command: Command) -> AppResult<()> {
        if !command.is_public() {
            let user = self.require_session(route_for(&command)).await?;
            debug!(username = %user.username, "Session restored");
        }
        commands::dispatch(self, command).await
    }

    /// Validate the stored token and pass the navigation gate for `route`.
    ///
    /// Landing anywhere but `route` means there is no usable session.
    pub async fn require_session(&self, route: Route) -> AppResult<User> {
        let session = self.ctx.session();
        let user = match session.restore().await? {
            Some(user) => user,
            None => {
                self.ctx.navigator().navigate(route);
                return Err(AppError::NotAuthenticated);
            }
        };
        if self.ctx.navigator().navigate(route) != route {
            return Err(AppError::NotAuthenticated);
        }
        info!(route = %route, "Opened {}", route.title());
        Ok(user)
    }

    /// Print and drop the notifications raised by the last command.
    pub fn flush_notifications(&self) {
        let notifications = self.ctx.notifications();
        for notification in notifications.active() {
            output::print_notification(&notification);
            notifications.dismiss(notification.id);
        }
    }
}

/// Page a command belongs to.
pub fn route_for(command: &Command) -> Route {
    match command {
        Command::Login(_) => Route::Login,
        Command::Register(_) => Route::Register,
        Command::Bots(_) => Route::Bots,
        Command::Ads(_) | Command::Media(_) => Route::Advertising,
        Command::Analytics(_) => Route::Analytics,
        Command::Profile(_) | Command::Whoami => Route::Profile,
        Command::Logout | Command::Dashboard | Command::Watch { .. } | Command::Config => {
            Route::Dashboard
        }
    }
}
