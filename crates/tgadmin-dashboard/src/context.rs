//! Dependencies shared by every view.

use crate::error::DashboardError;
use crate::notification::NotificationCenter;
use crate::router::Navigator;
use tgadmin_api::{ApiClient, ApiError, Session};

/// Session, notifications and navigation, passed explicitly to views.
#[derive(Debug, Clone)]
pub struct ViewContext {
    session: Session,
    notifications: NotificationCenter,
    navigator: Navigator,
}

impl ViewContext {
    pub fn new(session: Session, notifications: NotificationCenter) -> Self {
        let navigator = Navigator::new(session.clone(), notifications.clone());
        Self {
            session,
            notifications,
            navigator,
        }
    }

    pub fn api(&self) -> &ApiClient {
        self.session.api()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Failed action: error notification, or login on an expired session.
    pub(crate) fn action_failed(&self, err: ApiError, fallback: &str) -> DashboardError {
        self.navigator.handle_api_error(err, fallback)
    }

    /// Failed load: message for the view's error state.
    pub(crate) fn load_failed(&self, err: ApiError, fallback: &str) -> String {
        self.navigator.classify(err, fallback).to_string()
    }
}
