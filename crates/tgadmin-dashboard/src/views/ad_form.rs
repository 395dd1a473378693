//! Advertisement composition form.

use crate::error::{AdFormError, DashboardResult};
use crate::views::advertising::AdvertisingView;
use crate::views::media::MediaUpload;
use chrono::{DateTime, Utc};
use tgadmin_api::NewAdvertisement;
use tgadmin_core::{Advertisement, BotId, MediaAttachment, Price};

/// Raw form fields as the user entered them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdFormInput {
    pub title: String,
    pub content: String,
    /// Price as typed, e.g. `"9.99"` or `"$9.99"`.
    pub price: String,
    pub target_bots: Vec<BotId>,
    pub media: Vec<MediaAttachment>,
    /// Set when scheduling is enabled.
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl AdFormInput {
    /// Check fields in order: title, content, price, target bots, schedule.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<NewAdvertisement, AdFormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AdFormError::TitleRequired);
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(AdFormError::ContentRequired);
        }
        if self.price.trim().is_empty() {
            return Err(AdFormError::PriceRequired);
        }
        let price = Price::parse_input(&self.price).map_err(|_| AdFormError::InvalidPrice)?;
        if self.target_bots.is_empty() {
            return Err(AdFormError::NoTargetBots);
        }
        if let Some(at) = self.scheduled_for {
            if at <= now {
                return Err(AdFormError::ScheduleInPast);
            }
        }

        let mut target_bots = Vec::with_capacity(self.target_bots.len());
        for id in &self.target_bots {
            if !target_bots.contains(id) {
                target_bots.push(*id);
            }
        }
        Ok(NewAdvertisement {
            title: title.to_string(),
            content: content.to_string(),
            price,
            target_bots,
            scheduled_for: self.scheduled_for,
            media_urls: self.media.iter().map(|m| m.url.clone()).collect(),
        })
    }
}

/// Form state: fields, attached media and the inline error.
#[derive(Debug, Clone)]
pub struct AdvertisementForm {
    pub input: AdFormInput,
    media: MediaUpload,
    error: Option<String>,
}

impl AdvertisementForm {
    pub fn new(media: MediaUpload) -> Self {
        Self {
            input: AdFormInput::default(),
            media,
            error: None,
        }
    }

    pub fn media(&self) -> &MediaUpload {
        &self.media
    }

    /// Inline error from the last submission.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submit through `view`. The form is reset after a successful create.
    pub async fn submit(&mut self, view: &AdvertisingView) -> DashboardResult<Advertisement> {
        self.input.media = self.media.files();
        match view.create(&self.input).await {
            Ok(ad) => {
                self.reset();
                Ok(ad)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Clear the fields and the inline error. Uploaded media stay on the server.
    pub fn reset(&mut self) {
        self.input = AdFormInput::default();
        self.error = None;
        self.media.clear();
    }
}
