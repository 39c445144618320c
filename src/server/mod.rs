mod handlers;

use axum::{
    Router,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    routing::get,
};
use subtle::ConstantTimeEq;
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::{
    error::ApiError,
    session::{self, SESSION_COOKIE, SESSION_TTL},
    state::AppState,
    storage::PASSWORD_HEADER,
};

const ALLOW_METHODS: &str = "GET, PUT, POST, OPTIONS";
const ALLOW_HEADERS: &str = "content-type, x-editable-password";

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the full application: the content resource at the configured
/// endpoint, a health check, and the CORS, trace and panic layers.
pub fn router(state: AppState) -> Router {
    let endpoint = state.config.endpoint.clone();
    let cors_origin = state.config.cors_origin.clone();

    let resource = get(handlers::get_content)
        .put(handlers::put_content)
        .post(handlers::post_login)
        .options(handlers::options)
        .fallback(handlers::method_not_allowed);

    // CatchPanicLayer is outermost so it recovers from panics anywhere in the stack.
    Router::new()
        .route("/healthz", get(|| async { StatusCode::OK }))
        .route(&endpoint, resource)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            cors_origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

// ── Auth ──────────────────────────────────────────────────────────────────────

/// Accept a write when no password is configured, when the session cookie
/// carries a valid token, or when the password header matches.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.config.password.as_deref() else {
        return Ok(());
    };

    if let (Some(secret), Some(token)) = (
        state.config.session_secret.as_deref(),
        extract_session_cookie(headers),
    ) {
        if session::verify(&token, secret) {
            return Ok(());
        }
        tracing::debug!("Ignoring invalid or expired session cookie");
    }

    let supplied = headers
        .get(PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok());
    if let Some(supplied) = supplied {
        if passwords_match(supplied, expected) {
            return Ok(());
        }
    }

    tracing::warn!("Rejected unauthenticated write");
    Err(ApiError::Unauthorized)
}

fn passwords_match(supplied: &str, expected: &str) -> bool {
    bool::from(supplied.as_bytes().ct_eq(expected.as_bytes()))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .find_map(|part| part.trim().strip_prefix(&prefix).map(str::to_string))
}

fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL.as_secs()
    )
}
