//! In-memory cache of the content map, lazily loaded from a storage adapter
//! and updated by optimistic merge-and-persist.

use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    content::ContentMap,
    notify::{Listeners, Subscription},
    storage::StorageAdapter,
};

type PendingLoad = Shared<BoxFuture<'static, ()>>;

#[derive(Default)]
struct State {
    content: ContentMap,
    loaded: bool,
    /// Generation bumped by `reset`, so a load started before a reset does
    /// not mark the new generation as loaded.
    generation: u64,
    pending: Option<PendingLoad>,
}

struct Inner {
    adapter: Arc<dyn StorageAdapter>,
    state: Mutex<State>,
    listeners: Listeners,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        // Listeners never run under this lock; a poisoned guard is still consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Cheaply cloneable handle to one content cache.
#[derive(Clone)]
pub struct ContentStore {
    inner: Arc<Inner>,
}

impl ContentStore {
    pub fn new(adapter: Arc<dyn StorageAdapter>) -> Self {
        Self::with_listeners(adapter, Listeners::new())
    }

    /// Build a store that notifies an existing listener set, so content and
    /// edit-mode changes reach the same subscribers.
    pub fn with_listeners(adapter: Arc<dyn StorageAdapter>, listeners: Listeners) -> Self {
        Self {
            inner: Arc::new(Inner {
                adapter,
                state: Mutex::new(State::default()),
                listeners,
            }),
        }
    }

    pub fn listeners(&self) -> &Listeners {
        &self.inner.listeners
    }

    /// Fetch the content map once.
    ///
    /// Later calls return immediately; calls made while a fetch is in flight
    /// await that same fetch. An adapter error leaves the map empty and still
    /// counts as loaded.
    pub async fn load(&self) {
        let pending = {
            let mut state = self.inner.lock();
            if state.loaded {
                return;
            }
            match state.pending.clone() {
                Some(pending) => pending,
                None => {
                    let pending = Self::fetch(Arc::clone(&self.inner), state.generation);
                    state.pending = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await;
    }

    fn fetch(inner: Arc<Inner>, generation: u64) -> PendingLoad {
        async move {
            let next = match inner.adapter.load().await {
                Ok(next) => next,
                Err(e) => {
                    tracing::warn!("Content load failed, using defaults: {}", e);
                    ContentMap::new()
                }
            };
            {
                let mut state = inner.lock();
                if state.generation == generation {
                    state.content = next;
                    state.loaded = true;
                    state.pending = None;
                }
            }
            inner.listeners.notify();
        }
        .boxed()
        .shared()
    }

    /// Forget the loaded map so the next `load` fetches again from the same
    /// adapter. The adapter is fixed for the life of the store; switching
    /// adapters means building a new store (or a new [`crate::Editable`]).
    pub fn reset(&self) {
        let mut state = self.inner.lock();
        state.loaded = false;
        state.pending = None;
        state.generation += 1;
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.lock().loaded
    }

    /// Stored value for `id`, or `default` when absent or `null`.
    pub fn get_value(&self, id: &str, default: Value) -> Value {
        match self.inner.lock().content.get(id) {
            Some(Value::Null) | None => default,
            Some(v) => v.clone(),
        }
    }

    /// Typed read; a stored value of the wrong shape also yields `default`.
    pub fn get_as<T: DeserializeOwned>(&self, id: &str, default: T) -> T {
        let stored = match self.inner.lock().content.get(id) {
            Some(Value::Null) | None => return default,
            Some(v) => v.clone(),
        };
        serde_json::from_value(stored).unwrap_or(default)
    }

    pub fn snapshot(&self) -> ContentMap {
        self.inner.lock().content.clone()
    }

    /// Merge `next` under `id`, notify subscribers, then persist the whole map.
    ///
    /// A failed write is logged and dropped; the in-memory map stays
    /// authoritative for the rest of the session.
    pub async fn save_value(&self, id: &str, next: impl Into<Value>) {
        let next = next.into();
        self.load().await;

        let merged = {
            let mut state = self.inner.lock();
            state.content.insert(id.to_string(), next);
            state.content.clone()
        };
        self.inner.listeners.notify();

        if let Err(e) = self.inner.adapter.save(&merged).await {
            tracing::warn!("Persisting content for {} failed: {}", id, e);
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(listener)
    }
}
