//! Profile page: account details, API keys, activity and settings.
//!
//! Each section loads on its own, so one failing endpoint leaves the others
//! usable.

use crate::context::ViewContext;
use crate::error::{DashboardResult, ProfileFormError};
use crate::load_state::{LoadState, MountGuard};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tgadmin_api::DEFAULT_ACTIVITY_PER_PAGE;
use tgadmin_core::{ActivityPage, ApiKeyInfo, CreatedApiKey, User, UserSettings};
use tracing::debug;

/// Password change form.
#[derive(Clone, Default)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}

impl PasswordChange {
    pub fn validate(&self) -> Result<(), ProfileFormError> {
        if self.current.is_empty() || self.new.is_empty() || self.confirm.is_empty() {
            return Err(ProfileFormError::PasswordRequired);
        }
        if self.new != self.confirm {
            return Err(ProfileFormError::PasswordMismatch);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ProfileState {
    user: LoadState<User>,
    keys: LoadState<Vec<ApiKeyInfo>>,
    activity: LoadState<ActivityPage>,
    settings: LoadState<UserSettings>,
}

#[derive(Debug, Clone)]
pub struct ProfileView {
    ctx: ViewContext,
    guard: MountGuard,
    state: Arc<RwLock<ProfileState>>,
}

impl ProfileView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            guard: MountGuard::new(),
            state: Arc::new(RwLock::new(ProfileState::default())),
        }
    }

    pub fn user(&self) -> LoadState<User> {
        self.state.read().user.clone()
    }

    pub fn api_keys(&self) -> LoadState<Vec<ApiKeyInfo>> {
        self.state.read().keys.clone()
    }

    pub fn activity(&self) -> LoadState<ActivityPage> {
        self.state.read().activity.clone()
    }

    pub fn settings(&self) -> LoadState<UserSettings> {
        self.state.read().settings.clone()
    }

    pub fn unmount(&self) {
        self.guard.unmount();
    }

    /// Load every section. Stops early only when the session expired.
    pub async fn load(&self) {
        self.load_user().await;
        if !self.ctx.session().is_authenticated() {
            return;
        }
        self.load_api_keys().await;
        self.load_activity(1).await;
        self.load_settings().await;
    }

    pub async fn load_user(&self) -> LoadState<User> {
        self.state.write().user = LoadState::Loading;
        let result = self.ctx.api().profile().await;
        self.store(result, "Failed to load user data", |s| &mut s.user)
    }

    pub async fn load_api_keys(&self) -> LoadState<Vec<ApiKeyInfo>> {
        self.state.write().keys = LoadState::Loading;
        let result = self.ctx.api().list_api_keys().await;
        self.store(result, "Failed to load API keys", |s| &mut s.keys)
    }

    pub async fn load_activity(&self, page: u32) -> LoadState<ActivityPage> {
        self.state.write().activity = LoadState::Loading;
        let result = self
            .ctx
            .api()
            .activity(page, DEFAULT_ACTIVITY_PER_PAGE)
            .await;
        self.store(result, "Failed to load activity", |s| &mut s.activity)
    }

    pub async fn load_settings(&self) -> LoadState<UserSettings> {
        self.state.write().settings = LoadState::Loading;
        let result = self.ctx.api().settings().await;
        self.store(result, "Failed to load settings", |s| &mut s.settings)
    }

    fn store<T: Clone>(
        &self,
        result: tgadmin_api::ApiResult<T>,
        fallback: &str,
        slot: impl FnOnce(&mut ProfileState) -> &mut LoadState<T>,
    ) -> LoadState<T> {
        if !self.guard.is_mounted() {
            debug!(fallback, "Profile unmounted, dropping load result");
            return LoadState::Idle;
        }
        let next = match result {
            Ok(value) => LoadState::Loaded(value),
            Err(e) => LoadState::Failed(self.ctx.load_failed(e, fallback)),
        };
        *slot(&mut self.state.write()) = next.clone();
        next
    }

    /// Create an API key. The returned secret is shown once.
    pub async fn create_api_key(&self, name: &str) -> DashboardResult<CreatedApiKey> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileFormError::KeyNameRequired.into());
        }

        let created = self
            .ctx
            .api()
            .create_api_key(name)
            .await
            .map_err(|e| self.ctx.action_failed(e, "Failed to create API key"))?;

        if let Some(keys) = self.state.write().keys.value_mut() {
            keys.push(ApiKeyInfo {
                id: created.key_id,
                name: created.name.clone(),
                created_at: Some(chrono::Utc::now()),
                last_used_at: None,
                expires_at: created.expires_at,
            });
        }
        self.ctx
            .notifications()
            .success("API key created successfully");
        Ok(created)
    }

    pub async fn delete_api_key(&self, key_id: u64) -> DashboardResult<()> {
        self.ctx
            .api()
            .delete_api_key(key_id)
            .await
            .map_err(|e| self.ctx.action_failed(e, "Failed to delete API key"))?;

        if let Some(keys) = self.state.write().keys.value_mut() {
            keys.retain(|k| k.id != key_id);
        }
        self.ctx
            .notifications()
            .success("API key deleted successfully");
        Ok(())
    }

    pub async fn change_password(&self, form: &PasswordChange) -> DashboardResult<()> {
        form.validate()?;

        let user = self
            .ctx
            .api()
            .change_password(&form.current, &form.new)
            .await
            .map_err(|e| self.ctx.action_failed(e, "Failed to change password"))?;

        self.state.write().user = LoadState::Loaded(user);
        self.ctx
            .notifications()
            .success("Password changed successfully");
        Ok(())
    }

    pub async fn update_settings(&self, settings: &UserSettings) -> DashboardResult<UserSettings> {
        let stored = self
            .ctx
            .api()
            .update_settings(settings)
            .await
            .map_err(|e| self.ctx.action_failed(e, "Failed to update settings"))?;

        self.state.write().settings = LoadState::Loaded(stored.clone());
        self.ctx
            .notifications()
            .success("Settings updated successfully");
        Ok(stored)
    }
}
