//! Bot endpoints.

use crate::client::{Ack, ApiClient};
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use tgadmin_core::{Bot, BotId, BotStatus, MetricRecord};
use tracing::info;

#[derive(Serialize)]
struct NewBot<'a> {
    bot_token: &'a str,
    bot_name: &'a str,
}

#[derive(Deserialize)]
struct BotCreated {
    bot: Bot,
}

#[derive(Deserialize)]
struct StatusBody {
    status: String,
}

impl ApiClient {
    /// `GET /bots`.
    pub async fn list_bots(&self) -> ApiResult<Vec<Bot>> {
        self.get("bots").await
    }

    /// `POST /bots`. Returns the created bot as reported by the server.
    pub async fn add_bot(&self, bot_name: &str, bot_token: &str) -> ApiResult<Bot> {
        let created: BotCreated = self
            .post("bots", &NewBot {
                bot_token,
                bot_name,
            })
            .await?;
        info!(bot_id = %created.bot.id, bot_name, "Bot added");
        Ok(created.bot)
    }

    pub async fn start_bot(&self, id: BotId) -> ApiResult<Ack> {
        info!(bot_id = %id, "Starting bot");
        self.post_empty(&format!("bots/{id}/start")).await
    }

    pub async fn stop_bot(&self, id: BotId) -> ApiResult<Ack> {
        info!(bot_id = %id, "Stopping bot");
        self.post_empty(&format!("bots/{id}/stop")).await
    }

    pub async fn restart_bot(&self, id: BotId) -> ApiResult<Ack> {
        info!(bot_id = %id, "Restarting bot");
        self.post_empty(&format!("bots/{id}/restart")).await
    }

    /// `GET /bots/{id}/status`.
    pub async fn bot_status(&self, id: BotId) -> ApiResult<BotStatus> {
        let body: StatusBody = self.get(&format!("bots/{id}/status")).await?;
        Ok(BotStatus::from_wire(&body.status))
    }

    /// `GET /bots/{id}/metrics`: the most recent metric samples of one bot.
    pub async fn bot_metrics(&self, id: BotId) -> ApiResult<Vec<MetricRecord>> {
        self.get(&format!("bots/{id}/metrics")).await
    }
}
