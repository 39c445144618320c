//! Client components talking to a live endpoint over loopback HTTP.

use click2edit::{
    Editable, EditableConfig,
    backend::{ContentBackend, MemoryBackend},
    edit_mode::{Authorizer, EditMode, RemoteAuthorizer},
    server,
    state::{AppState, ServerConfig},
    storage::{HttpAdapter, MemorySlot, StorageAdapter, cookie_client},
};
use serde_json::json;
use std::sync::Arc;

const PASSWORD: &str = "secret123";

/// Serve a fresh endpoint on an ephemeral port; returns its URL and backend.
async fn spawn_endpoint(protect_reads: bool) -> (String, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let config = ServerConfig {
        password: Some(PASSWORD.into()),
        session_secret: Some("integration-secret".into()),
        protect_reads,
        ..ServerConfig::default()
    };
    let app = server::router(AppState::new(config, backend.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/__editable"), backend)
}

#[tokio::test]
async fn http_adapter_round_trip() {
    let (url, backend) = spawn_endpoint(false).await;
    let adapter = HttpAdapter::new(reqwest::Client::new(), &url).with_password(PASSWORD);

    assert!(adapter.load().await.unwrap().is_empty());

    let mut content = click2edit::ContentMap::new();
    content.insert("hero.title".into(), json!("Hi"));
    adapter.save(&content).await.unwrap();

    assert_eq!(backend.load().await.unwrap(), content);
    assert_eq!(adapter.load().await.unwrap(), content);
}

#[tokio::test]
async fn http_adapter_save_without_password_fails() {
    let (url, backend) = spawn_endpoint(false).await;
    let adapter = HttpAdapter::new(reqwest::Client::new(), &url);

    let mut content = click2edit::ContentMap::new();
    content.insert("cta".into(), json!("Go"));
    assert!(adapter.save(&content).await.is_err());
    assert!(backend.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn http_adapter_load_degrades_to_empty() {
    let (url, backend) = spawn_endpoint(true).await;
    let mut seeded = click2edit::ContentMap::new();
    seeded.insert("hero.title".into(), json!("Hidden"));
    backend.store(&seeded).await.unwrap();

    // 401 from a protected endpoint.
    let adapter = HttpAdapter::new(reqwest::Client::new(), &url);
    assert!(adapter.load().await.unwrap().is_empty());

    // Nothing listening.
    let dead = HttpAdapter::new(reqwest::Client::new(), "http://127.0.0.1:9/__editable");
    assert!(dead.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn remote_editing_session() {
    let (url, backend) = spawn_endpoint(false).await;
    let client = cookie_client().unwrap();

    // The adapter has no password: writes ride on the handshake cookie.
    let editable = Editable::new(
        EditableConfig {
            storage_adapter: Some(Arc::new(HttpAdapter::new(client.clone(), &url))),
            authorizer: Some(Arc::new(RemoteAuthorizer::new(client, &url))),
            ..Default::default()
        },
        MemorySlot::new(),
        Arc::new(MemorySlot::new()),
    );

    assert_eq!(editable.mode.toggle("wrong").await, EditMode::Viewing);
    assert_eq!(editable.mode.toggle(PASSWORD).await, EditMode::Editing);

    editable.store.save_value("features", vec!["fast", "small"]).await;
    editable.store.save_value("hero.title", "Hello").await;

    let stored = backend.load().await.unwrap();
    assert_eq!(
        serde_json::Value::Object(stored),
        json!({ "features": ["fast", "small"], "hero.title": "Hello" })
    );
}

#[tokio::test]
async fn handshake_cookie_authorizes_adapter_writes() {
    let (url, backend) = spawn_endpoint(false).await;
    let client = cookie_client().unwrap();
    let adapter = HttpAdapter::new(client.clone(), &url);

    let mut content = click2edit::ContentMap::new();
    content.insert("cta".into(), json!("Go"));
    assert!(adapter.save(&content).await.is_err());

    let authorizer = RemoteAuthorizer::new(client, &url);
    assert!(authorizer.check_password(PASSWORD).await);
    adapter.save(&content).await.unwrap();

    assert_eq!(backend.load().await.unwrap(), content);
}

#[tokio::test]
async fn client_without_cookie_store_cannot_write_after_handshake() {
    let (url, backend) = spawn_endpoint(false).await;
    let client = reqwest::Client::new();

    let authorizer = RemoteAuthorizer::new(client.clone(), &url);
    assert!(authorizer.check_password(PASSWORD).await);

    let mut content = click2edit::ContentMap::new();
    content.insert("cta".into(), json!("Go"));
    let adapter = HttpAdapter::new(client, &url);
    assert!(adapter.save(&content).await.is_err());
    assert!(backend.load().await.unwrap().is_empty());
}
