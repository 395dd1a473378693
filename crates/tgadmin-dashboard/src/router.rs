//! Routes and the navigation gate.
//!
//! Private routes require an authenticated session. An expired session
//! surfaces as `ApiError::Unauthorized`; [`Navigator::handle_api_error`]
//! turns that into a session teardown plus a move to the login route.

use crate::error::DashboardError;
use crate::notification::NotificationCenter;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tgadmin_api::{ApiError, Session};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Bots,
    Advertising,
    Analytics,
    Profile,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Bots,
        Route::Advertising,
        Route::Analytics,
        Route::Profile,
    ];

    pub fn is_private(&self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/",
            Self::Bots => "/bots",
            Self::Advertising => "/advertising",
            Self::Analytics => "/analytics",
            Self::Profile => "/profile",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Dashboard => "Dashboard",
            Self::Bots => "Bot Management",
            Self::Advertising => "Advertising",
            Self::Analytics => "Analytics",
            Self::Profile => "Profile",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim().trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };
        Self::ALL
            .into_iter()
            .find(|r| r.path() == path)
            .ok_or_else(|| DashboardError::NotFound(format!("route {s}")))
    }
}

/// Tracks the current route and enforces the private-route gate.
#[derive(Clone)]
pub struct Navigator {
    session: Session,
    notifications: NotificationCenter,
    route: Arc<watch::Sender<Route>>,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("route", &self.current())
            .finish()
    }
}

impl Navigator {
    pub fn new(session: Session, notifications: NotificationCenter) -> Self {
        let (route, _) = watch::channel(Route::Login);
        Self {
            session,
            notifications,
            route: Arc::new(route),
        }
    }

    pub fn current(&self) -> Route {
        *self.route.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.route.subscribe()
    }

    /// Move to `target` and return where navigation actually landed.
    ///
    /// Private routes fall back to the login route without a session, and an
    /// authenticated user asking for login or register lands on the dashboard.
    pub fn navigate(&self, target: Route) -> Route {
        let authenticated = self.session.is_authenticated();
        let landed = match target {
            r if r.is_private() && !authenticated => Route::Login,
            Route::Login | Route::Register if authenticated => Route::Dashboard,
            r => r,
        };
        if landed != target {
            info!(requested = %target, landed = %landed, "Navigation redirected");
        }
        self.route.send_replace(landed);
        landed
    }

    /// Re-check the current route against the session.
    pub fn refresh(&self) -> Route {
        self.navigate(self.current())
    }

    /// Report a failed request.
    ///
    /// An expired session tears down the session and moves to the login
    /// route without an alert. Anything else becomes an error notification
    /// with the server message or `fallback`.
    pub fn handle_api_error(&self, err: ApiError, fallback: &str) -> DashboardError {
        match self.classify(err, fallback) {
            DashboardError::Request(message) => {
                self.notifications.error(message.clone());
                DashboardError::Request(message)
            }
            other => other,
        }
    }

    /// Like [`handle_api_error`](Self::handle_api_error) but without the
    /// notification, for failures shown inline.
    pub fn classify(&self, err: ApiError, fallback: &str) -> DashboardError {
        if err.is_unauthorized() {
            warn!("Session expired, returning to login");
            self.session.expire();
            self.route.send_replace(Route::Login);
            return DashboardError::SessionExpired;
        }
        warn!(error = %err, "Request failed");
        DashboardError::Request(err.user_message(fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgadmin_api::{ApiClient, ApiConfig, MemoryTokenStore};

    fn navigator() -> (Navigator, NotificationCenter) {
        let api = ApiClient::new(
            ApiConfig::with_base_url("http://127.0.0.1:9/api"),
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();
        let notifications = NotificationCenter::default();
        (
            Navigator::new(Session::new(api), notifications.clone()),
            notifications,
        )
    }

    #[test]
    fn test_route_paths() {
        for route in Route::ALL {
            assert_eq!(route.path().parse::<Route>().unwrap(), route);
        }
        assert_eq!("/bots/".parse::<Route>().unwrap(), Route::Bots);
        assert!("/nowhere".parse::<Route>().is_err());
        assert!(!Route::Register.is_private());
        assert!(Route::Profile.is_private());
    }

    #[test]
    fn test_private_routes_need_session() {
        let (nav, _) = navigator();
        assert_eq!(nav.navigate(Route::Bots), Route::Login);
        assert_eq!(nav.navigate(Route::Register), Route::Register);
        assert_eq!(nav.current(), Route::Register);
    }

    #[test]
    fn test_unauthorized_redirects_without_alert() {
        let (nav, notifications) = navigator();
        let err = nav.handle_api_error(ApiError::Unauthorized, "Failed to load bots");
        assert!(err.is_session_expired());
        assert_eq!(nav.current(), Route::Login);
        assert!(notifications.active().is_empty());
    }

    #[test]
    fn test_server_error_notifies() {
        let (nav, notifications) = navigator();
        let err = nav.handle_api_error(
            ApiError::Server {
                status: 500,
                message: None,
            },
            "Failed to load bots",
        );
        assert_eq!(err.to_string(), "Failed to load bots");
        let active = notifications.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "Failed to load bots");
    }
}
