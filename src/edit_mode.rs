//! The viewing/editing switch, gated by an [`Authorizer`] and remembered in a
//! session-scoped marker.

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::{notify::Listeners, storage::KeyValueSlot};

/// Marker key used when no session key is configured.
pub const DEFAULT_SESSION_KEY: &str = "__editable_session__";

const MARKER_ON: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Viewing,
    Editing,
}

// ── Authorization strategies ──────────────────────────────────────────────────

/// Decides whether an entered password may switch editing on.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn check_password(&self, candidate: &str) -> bool;
}

/// Compares against a configured plaintext password. An empty configured
/// password accepts everything.
#[derive(Debug, Clone, Default)]
pub struct PlaintextPassword {
    expected: String,
}

impl PlaintextPassword {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

#[async_trait]
impl Authorizer for PlaintextPassword {
    async fn check_password(&self, candidate: &str) -> bool {
        self.expected.is_empty() || candidate == self.expected
    }
}

/// Runs the endpoint's password handshake (`POST {"password": ..}`).
///
/// On success the endpoint answers with a session cookie. Build the client
/// with [`crate::storage::cookie_client`] and hand the same client to
/// [`crate::storage::HttpAdapter`] so later writes carry that cookie.
#[derive(Clone)]
pub struct RemoteAuthorizer {
    client: reqwest::Client,
    url: String,
}

impl RemoteAuthorizer {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Authorizer for RemoteAuthorizer {
    async fn check_password(&self, candidate: &str) -> bool {
        let res = self
            .client
            .post(&self.url)
            .json(&json!({ "password": candidate }))
            .send()
            .await;
        match res {
            Ok(res) if res.status().is_success() => true,
            Ok(res) => {
                tracing::debug!("Password handshake refused: {}", res.status());
                false
            }
            Err(e) => {
                tracing::warn!("Password handshake with {} failed: {}", self.url, e);
                false
            }
        }
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Tracks the editing flag for one browser session.
#[derive(Clone)]
pub struct EditModeController {
    mode: Arc<Mutex<EditMode>>,
    marker: Arc<dyn KeyValueSlot>,
    session_key: String,
    authorizer: Arc<dyn Authorizer>,
    listeners: Listeners,
}

impl EditModeController {
    /// Restore the mode from `marker`: a reload within the same session keeps
    /// editing on, a fresh session starts in [`EditMode::Viewing`].
    pub fn new(
        marker: Arc<dyn KeyValueSlot>,
        session_key: impl Into<String>,
        authorizer: Arc<dyn Authorizer>,
        listeners: Listeners,
    ) -> Self {
        let session_key = session_key.into();
        let mode = match marker.get(&session_key).as_deref() {
            Some(MARKER_ON) => EditMode::Editing,
            _ => EditMode::Viewing,
        };
        Self {
            mode: Arc::new(Mutex::new(mode)),
            marker,
            session_key,
            authorizer,
            listeners,
        }
    }

    pub fn mode(&self) -> EditMode {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_editing(&self) -> bool {
        self.mode() == EditMode::Editing
    }

    /// Flip the mode. Turning editing on consults the authorizer with
    /// `entered`; turning it off never does.
    pub async fn toggle(&self, entered: &str) -> EditMode {
        match self.mode() {
            EditMode::Editing => {
                self.stop_editing();
                EditMode::Viewing
            }
            EditMode::Viewing => self.start_editing(entered).await,
        }
    }

    /// Switch editing on if `entered` is accepted. A refusal leaves the mode
    /// untouched; there is no lockout.
    pub async fn start_editing(&self, entered: &str) -> EditMode {
        if self.is_editing() {
            return EditMode::Editing;
        }
        if !self.authorizer.check_password(entered).await {
            tracing::info!("Edit mode refused");
            return EditMode::Viewing;
        }
        self.set(EditMode::Editing);
        EditMode::Editing
    }

    pub fn stop_editing(&self) {
        self.set(EditMode::Viewing);
    }

    fn set(&self, next: EditMode) {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner()) = next;

        let persisted = match next {
            EditMode::Editing => self.marker.set(&self.session_key, MARKER_ON),
            EditMode::Viewing => self.marker.remove(&self.session_key),
        };
        if let Err(e) = persisted {
            tracing::warn!("Could not persist edit mode marker: {}", e);
        }
        self.listeners.notify();
    }
}
