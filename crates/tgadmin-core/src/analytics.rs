//! Analytics records.

use crate::serde_helpers::flexible_time;
use crate::types::BotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric type counting distinct users.
pub const METRIC_USERS: &str = "users";
/// Metric type counting messages sent.
pub const METRIC_MESSAGES: &str = "messages";

/// A single metric sample recorded for a bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub bot_id: BotId,
    pub metric_type: String,
    /// Free-form value; count metrics carry `{"count": n}`.
    pub metric_value: serde_json::Value,
    #[serde(default, with = "flexible_time")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl MetricRecord {
    /// The `count` field of a count metric, zero otherwise.
    pub fn count(&self) -> u64 {
        self.metric_value
            .get("count")
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }
}

/// Aggregate metrics for the dashboard (last 24 hours).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default)]
    pub active_bots: u64,
    #[serde(default)]
    pub total_bots: u64,
    /// Samples keyed by bot id (JSON object keys are strings on the wire).
    #[serde(default)]
    pub metrics_by_bot: BTreeMap<String, Vec<MetricRecord>>,
}

/// Row of an analytics export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub timestamp: String,
    pub bot_name: String,
    pub metric_type: String,
    pub metric_value: serde_json::Value,
}
