use axum::http::HeaderValue;
use std::sync::Arc;

use crate::backend::ContentBackend;

/// Default path of the content resource.
pub const DEFAULT_ENDPOINT: &str = "/__editable";

/// Settings for the HTTP persistence endpoint.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path of the single content resource, always starting with `/`.
    pub endpoint: String,
    /// Editing password. Unset means writes are open.
    pub password: Option<String>,
    /// HMAC key for session tokens. Unset disables the POST handshake.
    pub session_secret: Option<String>,
    pub cors_origin: HeaderValue,
    /// Require the write credentials for GET as well.
    pub protect_reads: bool,
}

impl ServerConfig {
    pub fn new(endpoint: &str) -> Self {
        let trimmed = endpoint.trim().trim_end_matches('/');
        let endpoint = match trimmed.strip_prefix('/') {
            Some(rest) if !rest.is_empty() => trimmed.to_string(),
            None if !trimmed.is_empty() => format!("/{trimmed}"),
            _ => DEFAULT_ENDPOINT.to_string(),
        };
        Self {
            endpoint,
            password: None,
            session_secret: None,
            cors_origin: HeaderValue::from_static("*"),
            protect_reads: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub backend: Arc<dyn ContentBackend>,
}

impl AppState {
    pub fn new(config: ServerConfig, backend: Arc<dyn ContentBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }
}
