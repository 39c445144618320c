//! One editable page: content store and edit-mode controller sharing a
//! single set of subscribers.

use std::sync::Arc;

use crate::{
    edit_mode::{Authorizer, DEFAULT_SESSION_KEY, EditModeController, PlaintextPassword},
    notify::Subscription,
    storage::{DEFAULT_STORAGE_KEY, KeyValueSlot, LocalAdapter, StorageAdapter},
    store::ContentStore,
};

/// Construction-time settings for an [`Editable`].
pub struct EditableConfig {
    /// Plaintext password checked when no authorizer is given.
    pub password: String,
    /// Slot key for the local adapter when no adapter is given.
    pub storage_key: String,
    /// Marker key remembering edit mode within a session.
    pub session_key: String,
    pub storage_adapter: Option<Arc<dyn StorageAdapter>>,
    pub authorizer: Option<Arc<dyn Authorizer>>,
}

impl Default for EditableConfig {
    fn default() -> Self {
        Self {
            password: String::new(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            storage_adapter: None,
            authorizer: None,
        }
    }
}

#[derive(Clone)]
pub struct Editable {
    pub store: ContentStore,
    pub mode: EditModeController,
}

impl Editable {
    /// Wire a store and controller.
    ///
    /// `local` backs the content map when `config` names no adapter and
    /// `session` holds the edit-mode marker; in a browser these would be
    /// local and session storage.
    pub fn new<L>(config: EditableConfig, local: L, session: Arc<dyn KeyValueSlot>) -> Self
    where
        L: KeyValueSlot + 'static,
    {
        let adapter = config
            .storage_adapter
            .unwrap_or_else(|| Arc::new(LocalAdapter::with_key(local, config.storage_key)));
        let authorizer = config
            .authorizer
            .unwrap_or_else(|| Arc::new(PlaintextPassword::new(config.password)));

        let store = ContentStore::new(adapter);
        let mode = EditModeController::new(
            session,
            config.session_key,
            authorizer,
            store.listeners().clone(),
        );
        Self { store, mode }
    }

    /// Subscribe to content and edit-mode changes alike.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }
}
