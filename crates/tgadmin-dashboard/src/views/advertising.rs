//! Advertising page: list, create and broadcast.
//!
//! Broadcast in-flight tracking is per advertisement, so broadcasts of two
//! different advertisements may run at once while a second broadcast of the
//! same one is refused.

use crate::context::ViewContext;
use crate::error::{DashboardError, DashboardResult};
use crate::load_state::{LoadState, MountGuard};
use crate::views::ad_form::AdFormInput;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tgadmin_core::{AdStatus, Advertisement, AdvertisementId};
use tgadmin_realtime::{Event, RealtimeClient, Subscription, Topic};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct AdsState {
    list: LoadState<Vec<Advertisement>>,
    broadcasting: HashSet<AdvertisementId>,
    creating: bool,
}

#[derive(Debug, Clone)]
pub struct AdvertisingView {
    ctx: ViewContext,
    guard: MountGuard,
    state: Arc<RwLock<AdsState>>,
}

impl AdvertisingView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            guard: MountGuard::new(),
            state: Arc::new(RwLock::new(AdsState::default())),
        }
    }

    pub fn state(&self) -> LoadState<Vec<Advertisement>> {
        self.state.read().list.clone()
    }

    pub fn advertisements(&self) -> Vec<Advertisement> {
        self.state.read().list.value().cloned().unwrap_or_default()
    }

    pub fn advertisement(&self, id: AdvertisementId) -> Option<Advertisement> {
        self.state
            .read()
            .list
            .value()
            .and_then(|ads| ads.iter().find(|a| a.id == id).cloned())
    }

    pub fn unmount(&self) {
        self.guard.unmount();
    }

    pub async fn load(&self) -> LoadState<Vec<Advertisement>> {
        self.state.write().list = LoadState::Loading;
        let result = self.ctx.api().list_advertisements().await;

        if !self.guard.is_mounted() {
            debug!("Advertising unmounted, dropping load result");
            return self.state();
        }

        let next = match result {
            Ok(ads) => LoadState::Loaded(ads),
            Err(e) => {
                LoadState::Failed(self.ctx.load_failed(e, "Failed to load advertisements"))
            }
        };
        self.state.write().list = next.clone();
        next
    }

    /// True while a create request is outstanding.
    pub fn is_creating(&self) -> bool {
        self.state.read().creating
    }

    /// Validate and create an advertisement, appending the stored record.
    ///
    /// Invalid input is rejected without a request. A failed request is
    /// reported with the server message or a generic fallback.
    pub async fn create(&self, input: &AdFormInput) -> DashboardResult<Advertisement> {
        let body = input.validate(Utc::now())?;
        {
            let mut state = self.state.write();
            if state.creating {
                return Err(DashboardError::Busy(
                    "An advertisement is already being created".to_string(),
                ));
            }
            state.creating = true;
        }

        let result = self.ctx.api().create_advertisement(&body).await;
        self.state.write().creating = false;
        if !self.guard.is_mounted() {
            return Err(DashboardError::Unmounted);
        }

        match result {
            Ok(ad) => {
                let mut state = self.state.write();
                match state.list.value_mut() {
                    Some(ads) => ads.push(ad.clone()),
                    None => state.list = LoadState::Loaded(vec![ad.clone()]),
                }
                drop(state);
                self.ctx
                    .notifications()
                    .success("Advertisement created successfully");
                Ok(ad)
            }
            Err(e) => Err(self
                .ctx
                .action_failed(e, "Failed to create advertisement")),
        }
    }

    pub fn is_broadcasting(&self, id: AdvertisementId) -> bool {
        self.state.read().broadcasting.contains(&id)
    }

    /// "Broadcast now" is disabled while the same advertisement is in flight.
    pub fn can_broadcast(&self, id: AdvertisementId) -> bool {
        let state = self.state.read();
        !state.broadcasting.contains(&id)
            && state
                .list
                .value()
                .is_some_and(|ads| ads.iter().any(|a| a.id == id))
    }

    /// Broadcast an advertisement to its target bots.
    pub async fn broadcast(&self, id: AdvertisementId) -> DashboardResult<()> {
        let targets = {
            let mut state = self.state.write();
            let targets = state
                .list
                .value()
                .and_then(|ads| ads.iter().find(|a| a.id == id))
                .map(|ad| ad.target_bots.clone())
                .ok_or_else(|| DashboardError::NotFound(format!("advertisement {id}")))?;
            if !state.broadcasting.insert(id) {
                return Err(DashboardError::Busy(format!(
                    "Advertisement {id} is already being broadcast"
                )));
            }
            targets
        };

        let result = self.ctx.api().broadcast_advertisement(id, &targets).await;
        self.state.write().broadcasting.remove(&id);
        if !self.guard.is_mounted() {
            return Err(DashboardError::Unmounted);
        }

        match result {
            Ok(ack) => {
                info!(ad_id = %id, bots = targets.len(), "Broadcast started");
                self.apply_status(id, AdStatus::Broadcasting);
                self.ctx.notifications().success(
                    ack.message
                        .unwrap_or_else(|| "Broadcast started successfully".to_string()),
                );
                Ok(())
            }
            Err(e) => Err(self.ctx.action_failed(e, "Failed to broadcast advertisement")),
        }
    }

    /// Re-fetch one advertisement's status.
    pub async fn refresh_status(&self, id: AdvertisementId) -> DashboardResult<AdStatus> {
        match self.ctx.api().advertisement_status(id).await {
            Ok(status) => {
                self.apply_status(id, status);
                Ok(status)
            }
            Err(e) => Err(self.ctx.action_failed(e, "Failed to fetch advertisement status")),
        }
    }

    pub fn apply_status(&self, id: AdvertisementId, status: AdStatus) -> bool {
        let mut state = self.state.write();
        match state
            .list
            .value_mut()
            .and_then(|ads| ads.iter_mut().find(|a| a.id == id))
        {
            Some(ad) => {
                ad.status = status;
                true
            }
            None => false,
        }
    }

    /// Apply `broadcast-status-change` events from the real-time client.
    pub fn follow(&self, client: &RealtimeClient) -> Subscription {
        let view = self.clone();
        client.subscribe(Topic::BroadcastStatusChange, move |event: &Event| {
            let id = ["ad_id", "advertisement_id"]
                .iter()
                .find_map(|key| event.payload.get(*key))
                .and_then(|v| {
                    v.as_u64()
                        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
                });
            if let (Some(id), Some(status)) = (id, event.str_field("status")) {
                view.apply_status(AdvertisementId(id), AdStatus::from_wire(status));
            }
        })
    }
}
