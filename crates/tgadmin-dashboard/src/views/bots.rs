//! Bot Management page.
//!
//! Lifecycle actions mark the bot pending. The mark clears once the bot
//! reports the action's target status, either from the status re-fetch that
//! follows the action or from a `bot-status-change` event.

use crate::context::ViewContext;
use crate::error::{BotFormError, DashboardError, DashboardResult};
use crate::load_state::{LoadState, MountGuard};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tgadmin_core::{Bot, BotId, BotStatus};
use tgadmin_realtime::{Event, RealtimeClient, Subscription, Topic};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotAction {
    Start,
    Stop,
    Restart,
}

impl BotAction {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    /// Status the bot should report once the action took effect.
    pub fn target(&self) -> BotStatus {
        match self {
            Self::Start | Self::Restart => BotStatus::Running,
            Self::Stop => BotStatus::Stopped,
        }
    }

    /// Whether the action makes sense for a bot in `status`.
    pub fn applies_to(&self, status: BotStatus) -> bool {
        match self {
            Self::Start => status != BotStatus::Running,
            Self::Stop | Self::Restart => status == BotStatus::Running,
        }
    }

    fn past(&self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Restart => "restarted",
        }
    }
}

impl fmt::Display for BotAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[derive(Debug, Default)]
struct BotsState {
    list: LoadState<Vec<Bot>>,
    pending: HashMap<BotId, BotAction>,
}

impl BotsState {
    fn find(&self, id: BotId) -> Option<&Bot> {
        self.list.value()?.iter().find(|b| b.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct BotManagementView {
    ctx: ViewContext,
    guard: MountGuard,
    state: Arc<RwLock<BotsState>>,
}

impl BotManagementView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            guard: MountGuard::new(),
            state: Arc::new(RwLock::new(BotsState::default())),
        }
    }

    pub fn state(&self) -> LoadState<Vec<Bot>> {
        self.state.read().list.clone()
    }

    pub fn bots(&self) -> Vec<Bot> {
        self.state.read().list.value().cloned().unwrap_or_default()
    }

    pub fn bot(&self, id: BotId) -> Option<Bot> {
        self.state.read().find(id).cloned()
    }

    pub fn unmount(&self) {
        self.guard.unmount();
    }

    pub async fn load(&self) -> LoadState<Vec<Bot>> {
        self.state.write().list = LoadState::Loading;
        let result = self.ctx.api().list_bots().await;

        if !self.guard.is_mounted() {
            debug!("Bot list unmounted, dropping load result");
            return self.state();
        }

        let next = match result {
            Ok(bots) => LoadState::Loaded(bots),
            Err(e) => LoadState::Failed(self.ctx.load_failed(e, "Failed to load bots")),
        };
        self.state.write().list = next.clone();
        next
    }

    /// Register a bot. Both fields are required and checked before the request.
    pub async fn add_bot(&self, name: &str, token: &str) -> DashboardResult<Bot> {
        let name = name.trim();
        let token = token.trim();
        if name.is_empty() {
            return Err(BotFormError::NameRequired.into());
        }
        if token.is_empty() {
            return Err(BotFormError::TokenRequired.into());
        }

        let result = self.ctx.api().add_bot(name, token).await;
        if !self.guard.is_mounted() {
            return Err(DashboardError::Unmounted);
        }

        match result {
            Ok(bot) => {
                info!(bot_id = %bot.id, bot_name = %bot.bot_name, "Bot added");
                let mut state = self.state.write();
                match state.list.value_mut() {
                    Some(bots) => bots.push(bot.clone()),
                    None => state.list = LoadState::Loaded(vec![bot.clone()]),
                }
                drop(state);
                self.ctx.notifications().success("Bot added successfully");
                Ok(bot)
            }
            Err(e) => Err(self.ctx.action_failed(e, "Failed to add bot")),
        }
    }

    pub fn is_pending(&self, id: BotId) -> bool {
        self.state.read().pending.contains_key(&id)
    }

    pub fn pending_action(&self, id: BotId) -> Option<BotAction> {
        self.state.read().pending.get(&id).copied()
    }

    /// Disabled while any action on the bot is pending.
    pub fn is_action_enabled(&self, id: BotId, action: BotAction) -> bool {
        let state = self.state.read();
        if state.pending.contains_key(&id) {
            return false;
        }
        state
            .find(id)
            .map(|bot| action.applies_to(bot.status))
            .unwrap_or(false)
    }

    pub async fn start(&self, id: BotId) -> DashboardResult<()> {
        self.perform(id, BotAction::Start).await
    }

    pub async fn stop(&self, id: BotId) -> DashboardResult<()> {
        self.perform(id, BotAction::Stop).await
    }

    pub async fn restart(&self, id: BotId) -> DashboardResult<()> {
        self.perform(id, BotAction::Restart).await
    }

    pub async fn perform(&self, id: BotId, action: BotAction) -> DashboardResult<()> {
        {
            let mut state = self.state.write();
            if state.find(id).is_none() {
                return Err(DashboardError::NotFound(format!("bot {id}")));
            }
            if state.pending.contains_key(&id) {
                return Err(DashboardError::Busy(format!(
                    "An action for bot {id} is already in progress"
                )));
            }
            state.pending.insert(id, action);
        }
        debug!(bot_id = %id, %action, "Bot action pending");

        let api = self.ctx.api();
        let result = match action {
            BotAction::Start => api.start_bot(id).await,
            BotAction::Stop => api.stop_bot(id).await,
            BotAction::Restart => api.restart_bot(id).await,
        };
        if !self.guard.is_mounted() {
            self.state.write().pending.remove(&id);
            return Err(DashboardError::Unmounted);
        }

        let ack = match result {
            Ok(ack) => ack,
            Err(e) => {
                self.state.write().pending.remove(&id);
                return Err(self.ctx.action_failed(e, &format!("Failed to {action} bot")));
            }
        };
        self.ctx.notifications().success(
            ack.message
                .unwrap_or_else(|| format!("Bot {}", action.past())),
        );

        match api.bot_status(id).await {
            Ok(status) if status == action.target() || status == BotStatus::Error => {
                self.apply_status(id, status);
            }
            Ok(status) => {
                debug!(bot_id = %id, status = %status, "Waiting for status update");
            }
            Err(e) if e.is_unauthorized() => {
                self.state.write().pending.remove(&id);
                return Err(self.ctx.action_failed(e, "Failed to fetch bot status"));
            }
            Err(e) => {
                warn!(bot_id = %id, error = %e, "Bot status refresh failed");
            }
        }
        Ok(())
    }

    /// Record a status reported for a bot and clear its pending mark.
    pub fn apply_status(&self, id: BotId, status: BotStatus) -> bool {
        let mut state = self.state.write();
        state.pending.remove(&id);
        match state
            .list
            .value_mut()
            .and_then(|bots| bots.iter_mut().find(|b| b.id == id))
        {
            Some(bot) => {
                debug!(bot_id = %id, from = %bot.status, to = %status, "Bot status updated");
                bot.status = status;
                true
            }
            None => false,
        }
    }

    /// Apply `bot-status-change` events from the real-time client.
    pub fn follow(&self, client: &RealtimeClient) -> Subscription {
        let view = self.clone();
        client.subscribe(Topic::BotStatusChange, move |event: &Event| {
            let (Some(id), Some(status)) = (event.bot_id(), event.str_field("status")) else {
                return;
            };
            view.apply_status(id, BotStatus::from_wire(status));
        })
    }

    /// Bots whose name contains `query` (case-insensitive), optionally
    /// restricted to one status.
    pub fn filtered(&self, query: &str, status: Option<BotStatus>) -> Vec<Bot> {
        let needle = query.trim().to_lowercase();
        self.bots()
            .into_iter()
            .filter(|bot| needle.is_empty() || bot.bot_name.to_lowercase().contains(&needle))
            .filter(|bot| status.map_or(true, |s| bot.status == s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_targets() {
        assert_eq!(BotAction::Start.target(), BotStatus::Running);
        assert_eq!(BotAction::Stop.target(), BotStatus::Stopped);
        assert!(BotAction::Start.applies_to(BotStatus::Stopped));
        assert!(BotAction::Start.applies_to(BotStatus::Error));
        assert!(!BotAction::Start.applies_to(BotStatus::Running));
        assert!(BotAction::Restart.applies_to(BotStatus::Running));
        assert!(!BotAction::Stop.applies_to(BotStatus::Stopped));
        assert_eq!(BotAction::Restart.to_string(), "restart");
    }
}
