//! Session (auth context).
//!
//! State machine: `Unauthenticated -> Validating -> Authenticated`, and back
//! to `Unauthenticated` on logout or when the server rejects the token.
//! Transitions are published on a `watch` channel.

use crate::auth::Credentials;
use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use std::sync::Arc;
use tgadmin_core::User;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    /// A stored token is being checked against the server.
    Validating,
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Process-wide session handle. Clones share state.
#[derive(Debug, Clone)]
pub struct Session {
    api: ApiClient,
    state: Arc<watch::Sender<SessionState>>,
}

impl Session {
    pub fn new(api: ApiClient) -> Self {
        let (tx, _rx) = watch::channel(SessionState::Unauthenticated);
        Self {
            api,
            state: Arc::new(tx),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Authenticated(_))
    }

    /// True while a stored token is being validated.
    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Validating)
    }

    /// Stored token, used to open the real-time connection.
    pub fn token(&self) -> ApiResult<Option<String>> {
        self.api.token()
    }

    fn set(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        debug!(
            from = state_name(&previous),
            to = state_name(&self.state.borrow()),
            "Session transition"
        );
    }

    /// Validate a stored token at startup.
    ///
    /// Returns the user when the token is still valid. A rejected token has
    /// already been cleared and yields `Ok(None)`. Any other failure keeps the
    /// token for a later retry and is returned.
    pub async fn restore(&self) -> ApiResult<Option<User>> {
        if self.api.token()?.is_none() {
            self.set(SessionState::Unauthenticated);
            return Ok(None);
        }

        self.set(SessionState::Validating);
        match self.api.current_user().await {
            Ok(user) => {
                info!(username = %user.username, "Session restored");
                self.set(SessionState::Authenticated(user.clone()));
                Ok(Some(user))
            }
            Err(ApiError::Unauthorized) => {
                info!("Stored session token expired");
                self.set(SessionState::Unauthenticated);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Failed to validate stored session token");
                self.set(SessionState::Unauthenticated);
                Err(e)
            }
        }
    }

    /// Log in and persist the issued token. On failure the state is unchanged.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<User> {
        let response = self.api.login(credentials).await?;
        self.api.token_store().save(&response.token)?;
        self.set(SessionState::Authenticated(response.user.clone()));
        Ok(response.user)
    }

    /// Register, then log in. Uses the token from the registration response
    /// when the server issues one.
    pub async fn register(&self, credentials: &Credentials) -> ApiResult<User> {
        let response = self.api.register(credentials).await?;
        match (response.token, response.user) {
            (Some(token), Some(user)) => {
                self.api.token_store().save(&token)?;
                self.set(SessionState::Authenticated(user.clone()));
                Ok(user)
            }
            _ => self.login(credentials).await,
        }
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.api.token_store().clear()?;
        self.set(SessionState::Unauthenticated);
        info!("Logged out");
        Ok(())
    }

    /// Tear the session down after the server rejected the token.
    pub fn expire(&self) {
        if let Err(e) = self.api.token_store().clear() {
            warn!(error = %e, "Failed to clear session token");
        }
        if self.is_authenticated() || self.is_loading() {
            info!("Session expired");
        }
        self.set(SessionState::Unauthenticated);
    }
}

fn state_name(state: &SessionState) -> &'static str {
    match state {
        SessionState::Unauthenticated => "unauthenticated",
        SessionState::Validating => "validating",
        SessionState::Authenticated(_) => "authenticated",
    }
}
