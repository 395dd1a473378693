//! Transient notification queue.
//!
//! Notifications are kept in insertion order, never deduplicated, and expire
//! after the configured display duration unless dismissed earlier. Renderers
//! follow changes through [`NotificationCenter::events`].

use crate::config::NotificationConfig;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tgadmin_core::Severity;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub enum NotificationEvent {
    Shown(Notification),
    Dismissed(NotificationId),
    Expired(NotificationId),
}

struct Inner {
    entries: RwLock<Vec<Notification>>,
    next_id: AtomicU64,
    display_duration: Duration,
    events: broadcast::Sender<NotificationEvent>,
}

/// Shared notification queue. Clones refer to the same queue.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("active", &self.inner.entries.read().len())
            .field("display_duration", &self.inner.display_duration)
            .finish()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(&NotificationConfig::default())
    }
}

impl NotificationCenter {
    pub fn new(config: &NotificationConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
                display_duration: config.display_duration(),
                events,
            }),
        }
    }

    /// Queue a notification and return its id.
    pub fn show(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let id = NotificationId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let notification = Notification {
            id,
            message: message.into(),
            severity,
            created_at: Utc::now(),
            expires_at: Instant::now() + self.inner.display_duration,
        };
        debug!(%id, ?severity, message = %notification.message, "Notification shown");

        self.inner.entries.write().push(notification.clone());
        // No receivers is fine.
        let _ = self.inner.events.send(NotificationEvent::Shown(notification));
        id
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, Severity::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, Severity::Success)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, Severity::Warning)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, Severity::Error)
    }

    /// Remove a notification. Returns false if it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let removed = {
            let mut entries = self.inner.entries.write();
            let before = entries.len();
            entries.retain(|n| n.id != id);
            entries.len() != before
        };
        if removed {
            trace!(%id, "Notification dismissed");
            let _ = self.inner.events.send(NotificationEvent::Dismissed(id));
        }
        removed
    }

    /// Visible notifications in insertion order.
    pub fn active(&self) -> Vec<Notification> {
        let now = Instant::now();
        self.inner
            .entries
            .read()
            .iter()
            .filter(|n| !n.is_expired(now))
            .cloned()
            .collect()
    }

    /// Drop expired notifications and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<NotificationId> = {
            let mut entries = self.inner.entries.write();
            let expired = entries
                .iter()
                .filter(|n| n.is_expired(now))
                .map(|n| n.id)
                .collect();
            entries.retain(|n| !n.is_expired(now));
            expired
        };
        for id in &expired {
            let _ = self.inner.events.send(NotificationEvent::Expired(*id));
        }
        expired.len()
    }

    pub fn events(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    /// Purge expired notifications every `period` until cancelled.
    pub fn spawn_sweeper(&self, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let center = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let purged = center.purge_expired();
                        if purged > 0 {
                            trace!(purged, "Expired notifications removed");
                        }
                    }
                    () = cancel.cancelled() => break,
                }
            }
        })
    }
}
