//! Change listeners shared by the content store and the edit-mode controller.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<u64, Listener>>,
}

/// A cloneable handle to a set of zero-argument change callbacks.
#[derive(Clone, Default)]
pub struct Listeners {
    registry: Arc<Registry>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it runs on every subsequent `notify`.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut map) = self.registry.listeners.lock() {
            map.insert(id, Arc::new(listener));
        }
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Invoke every registered listener.
    ///
    /// The listener set is copied out first so callbacks may subscribe or
    /// unsubscribe without deadlocking.
    pub fn notify(&self) {
        let snapshot: Vec<Listener> = match self.registry.listeners.lock() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => return,
        };
        for listener in snapshot {
            listener();
        }
    }

    pub fn len(&self) -> usize {
        self.registry
            .listeners
            .lock()
            .map(|map| map.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`Listeners::subscribe`].
///
/// Dropping it keeps the listener registered; call [`Subscription::unsubscribe`]
/// to remove it.
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut map) = registry.listeners.lock() {
                map.remove(&self.id);
            }
        }
    }
}
