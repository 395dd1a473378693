//! Account endpoints behind the profile page.

use crate::client::{Ack, ApiClient};
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use tgadmin_core::{ActivityPage, ApiKeyInfo, CreatedApiKey, User, UserSettings};
use tracing::info;

/// Default activity page size.
pub const DEFAULT_ACTIVITY_PER_PAGE: u32 = 20;

#[derive(Serialize)]
struct PasswordChange<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

#[derive(Deserialize)]
struct ProfileUpdated {
    user: User,
}

#[derive(Serialize)]
struct NewApiKey<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct ApiKeyCreated {
    key: CreatedApiKey,
}

#[derive(Deserialize)]
struct SettingsUpdated {
    settings: UserSettings,
}

impl ApiClient {
    /// `GET /users/me`.
    pub async fn profile(&self) -> ApiResult<User> {
        self.get("users/me").await
    }

    /// `PUT /users/me` with the old and new password.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ApiResult<User> {
        let updated: ProfileUpdated = self
            .put(
                "users/me",
                &PasswordChange {
                    old_password,
                    new_password,
                },
            )
            .await?;
        info!(username = %updated.user.username, "Password changed");
        Ok(updated.user)
    }

    pub async fn list_api_keys(&self) -> ApiResult<Vec<ApiKeyInfo>> {
        self.get("users/me/api-keys").await
    }

    /// `POST /users/me/api-keys`. The returned secret is not retrievable later.
    pub async fn create_api_key(&self, name: &str) -> ApiResult<CreatedApiKey> {
        let created: ApiKeyCreated = self.post("users/me/api-keys", &NewApiKey { name }).await?;
        info!(key_id = created.key.key_id, name, "API key created");
        Ok(created.key)
    }

    pub async fn delete_api_key(&self, key_id: u64) -> ApiResult<Ack> {
        info!(key_id, "Deleting API key");
        self.delete(&format!("users/me/api-keys/{key_id}")).await
    }

    /// `GET /users/me/activity?page&per_page`. Pages start at 1.
    pub async fn activity(&self, page: u32, per_page: u32) -> ApiResult<ActivityPage> {
        self.get_query(
            "users/me/activity",
            &[("page", page.max(1)), ("per_page", per_page)],
        )
        .await
    }

    pub async fn settings(&self) -> ApiResult<UserSettings> {
        self.get("users/me/settings").await
    }

    /// `PUT /users/me/settings`. Returns the settings as stored by the server.
    pub async fn update_settings(&self, settings: &UserSettings) -> ApiResult<UserSettings> {
        let updated: SettingsUpdated = self.put("users/me/settings", settings).await?;
        Ok(updated.settings)
    }
}
