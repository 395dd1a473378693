//! Topic registry: topic -> ordered handler list.

use crate::message::{Event, Topic};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// A registered handler. `active` is shared with its [`Subscription`].
#[derive(Clone)]
struct Entry {
    id: u64,
    active: Arc<AtomicBool>,
    handler: Handler,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    topics: HashMap<Topic, Vec<Entry>>,
}

/// Registry of topic handlers. Clones share the same handlers.
#[derive(Clone, Default)]
pub struct TopicRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl std::fmt::Debug for TopicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("TopicRegistry")
            .field("topics", &inner.topics.len())
            .finish()
    }
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`. Handlers of one topic run in
    /// registration order.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.topics.entry(topic.clone()).or_default().push(Entry {
            id,
            active: active.clone(),
            handler: Arc::new(handler),
        });
        debug!(%topic, id, "Handler subscribed");

        Subscription {
            registry: Arc::downgrade(&self.inner),
            topic,
            id,
            active,
        }
    }

    /// Deliver `event` to every handler of its topic. Returns the number of
    /// handlers invoked.
    ///
    /// Handlers are snapshotted first and run without the lock held, so a
    /// handler may subscribe or unsubscribe. Each entry's active flag is
    /// checked right before its call, so a handler unsubscribed from another
    /// thread mid-dispatch is skipped.
    pub fn dispatch(&self, event: &Event) -> usize {
        let entries: Vec<Entry> = {
            let inner = self.inner.read();
            inner
                .topics
                .get(&event.topic)
                .cloned()
                .unwrap_or_default()
        };

        trace!(topic = %event.topic, handlers = entries.len(), "Dispatching event");
        let mut invoked = 0;
        for entry in &entries {
            if !entry.active.load(Ordering::Acquire) {
                continue;
            }
            (entry.handler)(event);
            invoked += 1;
        }
        invoked
    }

    pub fn handler_count(&self, topic: &Topic) -> usize {
        self.inner
            .read()
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Drop every handler.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        let count: usize = inner.topics.values().map(Vec::len).sum();
        for entry in inner.topics.values().flatten() {
            entry.active.store(false, Ordering::Release);
        }
        inner.topics.clear();
        debug!(count, "All handlers cleared");
    }
}

fn remove(inner: &RwLock<RegistryInner>, topic: &Topic, id: u64) -> bool {
    let mut inner = inner.write();
    let Some(entries) = inner.topics.get_mut(topic) else {
        return false;
    };
    let before = entries.len();
    entries.retain(|entry| entry.id != id);
    let removed = entries.len() != before;
    if entries.is_empty() {
        inner.topics.remove(topic);
    }
    removed
}

/// Handle for one registered handler.
///
/// Dropping the handle keeps the handler registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "dropping a Subscription does not unsubscribe; keep it to unsubscribe later"]
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<RwLock<RegistryInner>>,
    topic: Topic,
    id: u64,
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Remove this handler. Idempotent; other handlers of the same topic are
    /// unaffected. Returns `true` only on the call that removed the handler.
    pub fn unsubscribe(&self) -> bool {
        if !self.active.swap(false, Ordering::AcqRel) {
            return false;
        }
        let Some(inner) = self.registry.upgrade() else {
            return false;
        };
        let removed = remove(&inner, &self.topic, self.id);
        debug!(topic = %self.topic, id = self.id, removed, "Handler unsubscribed");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Barrier;
    use std::thread;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&Event) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |name: &str| {
            let log = log_clone.clone();
            let name = name.to_string();
            Box::new(move |_: &Event| log.lock().push(name.clone())) as Box<dyn Fn(&Event) + Send + Sync>
        };
        (log, make)
    }

    fn bot_event() -> Event {
        Event::new(Topic::BotStatusChange, json!({"bot_id": 1, "status": "running"}))
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let registry = TopicRegistry::new();
        let (log, make) = recorder();

        let _a = registry.subscribe(Topic::BotStatusChange, make("a"));
        let _b = registry.subscribe(Topic::BotStatusChange, make("b"));
        let _c = registry.subscribe(Topic::BotStatusChange, make("c"));

        assert_eq!(registry.dispatch(&bot_event()), 3);
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dispatch_only_matching_topic() {
        let registry = TopicRegistry::new();
        let (log, make) = recorder();

        let _bot = registry.subscribe(Topic::BotStatusChange, make("bot"));
        let _err = registry.subscribe(Topic::Error, make("err"));

        registry.dispatch(&Event::error("boom"));
        assert_eq!(*log.lock(), vec!["err"]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent_and_isolated() {
        let registry = TopicRegistry::new();
        let (log, make) = recorder();

        let a = registry.subscribe(Topic::BotStatusChange, make("a"));
        let _b = registry.subscribe(Topic::BotStatusChange, make("b"));

        assert!(a.unsubscribe());
        assert!(!a.unsubscribe());
        assert!(!a.is_active());

        registry.dispatch(&bot_event());
        assert_eq!(*log.lock(), vec!["b"]);
        assert_eq!(registry.handler_count(&Topic::BotStatusChange), 1);
    }

    #[test]
    fn test_unsubscribe_from_other_thread_mid_dispatch() {
        let registry = TopicRegistry::new();
        let (log, make) = recorder();
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        let _a = {
            let entered = entered.clone();
            let release = release.clone();
            registry.subscribe(Topic::BotStatusChange, move |_| {
                entered.wait();
                release.wait();
            })
        };
        let b = registry.subscribe(Topic::BotStatusChange, make("b"));

        let dispatcher = {
            let registry = registry.clone();
            thread::spawn(move || registry.dispatch(&bot_event()))
        };

        entered.wait();
        assert!(b.unsubscribe());
        release.wait();

        assert_eq!(dispatcher.join().unwrap(), 1);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_same_closure_registered_twice() {
        let registry = TopicRegistry::new();
        let hits = Arc::new(Mutex::new(0u32));
        let handler = {
            let hits = hits.clone();
            move |_: &Event| *hits.lock() += 1
        };

        let first = registry.subscribe(Topic::Error, handler.clone());
        let _second = registry.subscribe(Topic::Error, handler);
        first.unsubscribe();

        registry.dispatch(&Event::error("x"));
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let registry = TopicRegistry::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let hits = Arc::new(Mutex::new(0u32));

        let sub = {
            let slot = slot.clone();
            let hits = hits.clone();
            registry.subscribe(Topic::Error, move |_| {
                *hits.lock() += 1;
                if let Some(sub) = slot.lock().as_ref() {
                    sub.unsubscribe();
                }
            })
        };
        *slot.lock() = Some(sub);

        registry.dispatch(&Event::error("once"));
        registry.dispatch(&Event::error("twice"));
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let registry = TopicRegistry::new();
        let (log, make) = recorder();
        let sub = registry.subscribe(Topic::Error, make("e"));

        registry.clear();
        assert_eq!(registry.dispatch(&Event::error("x")), 0);
        assert!(log.lock().is_empty());
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let registry = TopicRegistry::new();
        let sub = registry.subscribe(Topic::Error, |_| {});
        drop(registry);
        assert!(!sub.unsubscribe());
    }
}
