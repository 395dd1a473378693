//! Analytics endpoints.

use crate::client::ApiClient;
use crate::error::ApiResult;
use tgadmin_core::{BotId, DashboardMetrics, ExportRow, MetricRecord};

/// Default period of the per-bot analytics view, in days.
pub const DEFAULT_BOT_ANALYTICS_DAYS: u32 = 7;
/// Default period of an analytics export, in days.
pub const DEFAULT_EXPORT_DAYS: u32 = 30;

impl ApiClient {
    /// `GET /analytics/dashboard`: aggregates over the last 24 hours.
    pub async fn dashboard_metrics(&self) -> ApiResult<DashboardMetrics> {
        self.get("analytics/dashboard").await
    }

    /// `GET /analytics/bots/{id}?days=N`.
    pub async fn bot_analytics(&self, id: BotId, days: u32) -> ApiResult<Vec<MetricRecord>> {
        self.get_query(&format!("analytics/bots/{id}"), &[("days", days)])
            .await
    }

    /// `GET /analytics/export?days=N`.
    pub async fn export_analytics(&self, days: u32) -> ApiResult<Vec<ExportRow>> {
        self.get_query("analytics/export", &[("days", days)]).await
    }
}
