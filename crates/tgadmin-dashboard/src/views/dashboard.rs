//! Dashboard page: aggregate counters.

use crate::context::ViewContext;
use crate::load_state::{LoadState, MountGuard};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tgadmin_api::ApiError;
use tgadmin_core::{Advertisement, DashboardMetrics};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardSummary {
    pub total_bots: u64,
    pub active_bots: u64,
    pub total_users: u64,
    pub total_messages: u64,
    /// Advertisements pending or broadcasting.
    pub active_ads: u64,
}

impl DashboardSummary {
    pub fn from_parts(metrics: &DashboardMetrics, ads: &[Advertisement]) -> Self {
        Self {
            total_bots: metrics.total_bots,
            active_bots: metrics.active_bots,
            total_users: metrics.total_users,
            total_messages: metrics.total_messages,
            active_ads: ads.iter().filter(|ad| ad.status.is_active()).count() as u64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    ctx: ViewContext,
    guard: MountGuard,
    state: Arc<RwLock<LoadState<DashboardSummary>>>,
}

impl DashboardView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            guard: MountGuard::new(),
            state: Arc::new(RwLock::new(LoadState::Idle)),
        }
    }

    pub fn state(&self) -> LoadState<DashboardSummary> {
        self.state.read().clone()
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    pub fn unmount(&self) {
        self.guard.unmount();
    }

    /// Fetch metrics, then advertisements.
    pub async fn load(&self) -> LoadState<DashboardSummary> {
        *self.state.write() = LoadState::Loading;

        let result = async {
            let metrics = self.ctx.api().dashboard_metrics().await?;
            let ads = self.ctx.api().list_advertisements().await?;
            Ok::<_, ApiError>(DashboardSummary::from_parts(&metrics, &ads))
        }
        .await;

        if !self.guard.is_mounted() {
            debug!("Dashboard unmounted, dropping load result");
            return self.state();
        }

        let next = match result {
            Ok(summary) => LoadState::Loaded(summary),
            Err(e) => LoadState::Failed(self.ctx.load_failed(e, "Failed to load dashboard")),
        };
        *self.state.write() = next.clone();
        next
    }
}
