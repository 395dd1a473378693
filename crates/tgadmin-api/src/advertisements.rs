//! Advertisement endpoints.

use crate::client::{Ack, ApiClient};
use crate::error::ApiResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tgadmin_core::{AdStatus, Advertisement, AdvertisementId, BotId, Price};
use tracing::info;

/// Body of `POST /advertisements`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAdvertisement {
    pub title: String,
    pub content: String,
    pub price: Price,
    pub target_bots: Vec<BotId>,
    #[serde(serialize_with = "naive_utc")]
    pub scheduled_for: Option<DateTime<Utc>>,
    pub media_urls: Vec<String>,
}

/// The server parses schedule times as naive ISO-8601 in UTC.
fn naive_utc<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.serialize_str(&dt.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string()),
        None => serializer.serialize_none(),
    }
}

#[derive(Deserialize)]
struct AdvertisementCreated {
    advertisement: Advertisement,
}

#[derive(Serialize)]
struct BroadcastBody<'a> {
    bot_ids: &'a [BotId],
}

#[derive(Deserialize)]
struct StatusBody {
    status: String,
}

impl ApiClient {
    /// `GET /advertisements`.
    pub async fn list_advertisements(&self) -> ApiResult<Vec<Advertisement>> {
        self.get("advertisements").await
    }

    /// `POST /advertisements`. Returns the stored record.
    pub async fn create_advertisement(&self, ad: &NewAdvertisement) -> ApiResult<Advertisement> {
        let created: AdvertisementCreated = self.post("advertisements", ad).await?;
        let mut record = created.advertisement;
        // Older servers do not echo title/targets back.
        if record.title.is_empty() {
            record.title = ad.title.clone();
        }
        if record.target_bots.is_empty() {
            record.target_bots = ad.target_bots.clone();
        }
        info!(ad_id = %record.id, targets = record.target_bots.len(), "Advertisement created");
        Ok(record)
    }

    /// `POST /advertisements/{id}/broadcast`.
    pub async fn broadcast_advertisement(
        &self,
        id: AdvertisementId,
        bot_ids: &[BotId],
    ) -> ApiResult<Ack> {
        info!(ad_id = %id, bots = bot_ids.len(), "Broadcasting advertisement");
        self.post(&format!("advertisements/{id}/broadcast"), &BroadcastBody { bot_ids })
            .await
    }

    /// `GET /advertisements/{id}/status`.
    pub async fn advertisement_status(&self, id: AdvertisementId) -> ApiResult<AdStatus> {
        let body: StatusBody = self.get(&format!("advertisements/{id}/status")).await?;
        Ok(AdStatus::from_wire(&body.status))
    }
}
