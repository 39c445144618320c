use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{authorize, passwords_match, session_cookie};
use crate::{
    content::ContentMap,
    error::{ApiError, json_response},
    session,
    state::AppState,
};

// ── Preflight ─────────────────────────────────────────────────────────────────

pub async fn options() -> Response {
    json_response(StatusCode::OK, &json!({ "ok": true }))
}

// ── Read ──────────────────────────────────────────────────────────────────────

pub async fn get_content(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    state.backend.ready()?;
    if state.config.protect_reads {
        authorize(&state, &headers)?;
    }

    // An unreachable or unreadable store serves the defaults instead of failing.
    let content = match state.backend.load().await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Content load failed, serving empty map: {}", e);
            ContentMap::new()
        }
    };
    Ok(json_response(StatusCode::OK, &Value::Object(content)))
}

// ── Write ─────────────────────────────────────────────────────────────────────

pub async fn put_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    state.backend.ready()?;
    authorize(&state, &headers)?;

    let content = parse_body(&body)?;
    state.backend.store(&content).await?;
    tracing::info!("Stored {} content fields", content.len());

    Ok(json_response(StatusCode::OK, &json!({ "ok": true })))
}

/// An empty body counts as `{}`; anything but a JSON object is rejected.
fn parse_body(body: &[u8]) -> Result<ContentMap, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ContentMap::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::BadRequest("Body must be a JSON object")),
        Err(_) => Err(ApiError::BadRequest("Invalid JSON body")),
    }
}

// ── Password handshake ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginBody {
    #[serde(default)]
    password: String,
}

pub async fn post_login(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    state.backend.ready()?;
    let Some(secret) = state.config.session_secret.as_deref() else {
        return Err(ApiError::MethodNotAllowed);
    };

    let login: LoginBody =
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest("Invalid JSON body"))?;

    let accepted = match state.config.password.as_deref() {
        Some(expected) => passwords_match(&login.password, expected),
        None => true,
    };
    if !accepted {
        tracing::warn!("Rejected password handshake");
        return Err(ApiError::Unauthorized);
    }

    let token = session::issue(secret).map_err(|e| ApiError::Internal(e.to_string()))?;
    tracing::info!("Issued editing session");

    let mut res = json_response(StatusCode::OK, &json!({ "ok": true }));
    let cookie: HeaderValue = session_cookie(&token)
        .parse()
        .map_err(|_| ApiError::Internal("Session cookie is not a valid header".into()))?;
    res.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(res)
}

// ── Fallbacks ─────────────────────────────────────────────────────────────────

pub async fn method_not_allowed() -> impl IntoResponse {
    ApiError::MethodNotAllowed
}

pub async fn not_found() -> impl IntoResponse {
    ApiError::NotFound
}
