//! Authentication endpoints.

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use tgadmin_core::User;
use tracing::info;

/// Username/password pair for login and registration.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-blank.
    pub fn validate(&self) -> ApiResult<()> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::InvalidInput("All fields are required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Registration result. Older servers answer with only a message, in which
/// case the caller has to log in separately.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CurrentUserResponse {
    Wrapped { user: User },
    Bare(User),
}

impl ApiClient {
    /// `POST /auth/login`. Does not persist the returned token.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        credentials.validate()?;
        let response: LoginResponse = self.post_public("auth/login", credentials).await?;
        info!(username = %response.user.username, "Logged in");
        Ok(response)
    }

    /// `POST /auth/register`.
    pub async fn register(&self, credentials: &Credentials) -> ApiResult<RegisterResponse> {
        credentials.validate()?;
        let response: Option<RegisterResponse> =
            self.post_public("auth/register", credentials).await?;
        info!(username = %credentials.username, "Registered");
        Ok(response.unwrap_or_default())
    }

    /// `GET /auth/me`.
    pub async fn current_user(&self) -> ApiResult<User> {
        let response: CurrentUserResponse = self.get("auth/me").await?;
        Ok(match response {
            CurrentUserResponse::Wrapped { user } | CurrentUserResponse::Bare(user) => user,
        })
    }
}
