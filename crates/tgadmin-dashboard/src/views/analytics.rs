//! Analytics page.

use crate::context::ViewContext;
use crate::error::{DashboardError, DashboardResult};
use crate::load_state::{LoadState, MountGuard};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tgadmin_api::{DEFAULT_BOT_ANALYTICS_DAYS, DEFAULT_EXPORT_DAYS};
use tgadmin_core::analytics::{METRIC_MESSAGES, METRIC_USERS};
use tgadmin_core::{BotId, DashboardMetrics, ExportRow, MetricRecord};
use tracing::debug;

/// Per-bot totals derived from the dashboard metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotPerformance {
    /// Bot id as reported in `metrics_by_bot`.
    pub bot: String,
    pub users: u64,
    pub messages: u64,
    pub samples: usize,
}

pub fn performance(metrics: &DashboardMetrics) -> Vec<BotPerformance> {
    let mut rows: Vec<BotPerformance> = metrics
        .metrics_by_bot
        .iter()
        .map(|(bot, records)| {
            let total = |kind: &str| {
                records
                    .iter()
                    .filter(|r| r.metric_type == kind)
                    .map(MetricRecord::count)
                    .sum::<u64>()
            };
            BotPerformance {
                bot: bot.clone(),
                users: total(METRIC_USERS),
                messages: total(METRIC_MESSAGES),
                samples: records.len(),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.messages.cmp(&a.messages).then_with(|| a.bot.cmp(&b.bot)));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotAnalytics {
    pub bot_id: BotId,
    pub days: u32,
    pub records: Vec<MetricRecord>,
}

#[derive(Debug, Default)]
struct AnalyticsState {
    overview: LoadState<DashboardMetrics>,
    bot: LoadState<BotAnalytics>,
    exporting: bool,
}

#[derive(Debug, Clone)]
pub struct AnalyticsView {
    ctx: ViewContext,
    guard: MountGuard,
    state: Arc<RwLock<AnalyticsState>>,
}

impl AnalyticsView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            guard: MountGuard::new(),
            state: Arc::new(RwLock::new(AnalyticsState::default())),
        }
    }

    pub fn overview(&self) -> LoadState<DashboardMetrics> {
        self.state.read().overview.clone()
    }

    pub fn bot_analytics(&self) -> LoadState<BotAnalytics> {
        self.state.read().bot.clone()
    }

    pub fn performance(&self) -> Vec<BotPerformance> {
        self.state
            .read()
            .overview
            .value()
            .map(performance)
            .unwrap_or_default()
    }

    pub fn unmount(&self) {
        self.guard.unmount();
    }

    pub async fn load(&self) -> LoadState<DashboardMetrics> {
        self.state.write().overview = LoadState::Loading;
        let result = self.ctx.api().dashboard_metrics().await;

        if !self.guard.is_mounted() {
            debug!("Analytics unmounted, dropping load result");
            return self.overview();
        }

        let next = match result {
            Ok(metrics) => LoadState::Loaded(metrics),
            Err(e) => LoadState::Failed(self.ctx.load_failed(e, "Failed to load analytics")),
        };
        self.state.write().overview = next.clone();
        next
    }

    /// Samples for one bot over the last `days` (7 when `None`).
    pub async fn load_bot(&self, bot_id: BotId, days: Option<u32>) -> LoadState<BotAnalytics> {
        let days = days.unwrap_or(DEFAULT_BOT_ANALYTICS_DAYS).max(1);
        self.state.write().bot = LoadState::Loading;
        let result = self.ctx.api().bot_analytics(bot_id, days).await;

        if !self.guard.is_mounted() {
            return self.bot_analytics();
        }

        let next = match result {
            Ok(records) => LoadState::Loaded(BotAnalytics {
                bot_id,
                days,
                records,
            }),
            Err(e) => LoadState::Failed(self.ctx.load_failed(e, "Failed to load bot analytics")),
        };
        self.state.write().bot = next.clone();
        next
    }

    pub fn is_exporting(&self) -> bool {
        self.state.read().exporting
    }

    /// Export rows for the last `days` (30 when `None`).
    pub async fn export(&self, days: Option<u32>) -> DashboardResult<Vec<ExportRow>> {
        let days = days.unwrap_or(DEFAULT_EXPORT_DAYS).max(1);
        {
            let mut state = self.state.write();
            if state.exporting {
                return Err(DashboardError::Busy("An export is already running".into()));
            }
            state.exporting = true;
        }
        let result = self.ctx.api().export_analytics(days).await;
        self.state.write().exporting = false;

        result.map_err(|e| self.ctx.action_failed(e, "Failed to export analytics"))
    }

    /// Export as pretty-printed JSON.
    pub async fn export_json(&self, days: Option<u32>) -> DashboardResult<String> {
        let rows = self.export(days).await?;
        serde_json::to_string_pretty(&rows)
            .map_err(|e| DashboardError::Request(format!("Failed to encode export: {e}")))
    }
}
