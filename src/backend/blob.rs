use async_trait::async_trait;
use reqwest::{StatusCode, header};

use super::{BackendError, ContentBackend};
use crate::content::{ContentMap, parse_content};

/// Object name the content document is stored under.
pub const BLOB_PATHNAME: &str = "click2edit/editable-content.json";

/// Content document kept in an HTTP blob store.
///
/// The object lives at `{base_url}/{BLOB_PATHNAME}`; reads and writes carry
/// the read-write token as a bearer credential.
pub struct BlobBackend {
    client: reqwest::Client,
    base_url: Option<String>,
    token: Option<String>,
}

impl BlobBackend {
    pub fn new(client: reqwest::Client, base_url: Option<String>, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    fn target(&self) -> Result<(String, &str), BackendError> {
        let token = self
            .token
            .as_deref()
            .ok_or(BackendError::NotConfigured("Missing Blob token env variable"))?;
        let base = self
            .base_url
            .as_deref()
            .ok_or(BackendError::NotConfigured("Missing Blob base URL"))?;
        Ok((format!("{base}/{BLOB_PATHNAME}"), token))
    }
}

#[async_trait]
impl ContentBackend for BlobBackend {
    fn ready(&self) -> Result<(), BackendError> {
        self.target().map(|_| ())
    }

    async fn load(&self) -> Result<ContentMap, BackendError> {
        let (url, token) = self.target()?;
        let res = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await?;
        match res.status() {
            StatusCode::NOT_FOUND => Ok(ContentMap::new()),
            s if s.is_success() => Ok(parse_content(Some(&res.text().await?))),
            s => Err(BackendError::Status(s)),
        }
    }

    async fn store(&self, content: &ContentMap) -> Result<(), BackendError> {
        let (url, token) = self.target()?;
        let body = serde_json::to_vec(content)?;
        let res = self
            .client
            .put(&url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CACHE_CONTROL, "max-age=0")
            .body(body)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(BackendError::Status(res.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        extract::State,
        http::HeaderMap,
        response::{IntoResponse, Response},
        routing::get,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    const TOKEN: &str = "tok";

    /// Loopback stand-in for the blob store: one object, bearer-gated.
    #[derive(Clone, Default)]
    struct FakeStore {
        object: Arc<Mutex<Option<String>>>,
        content_types: Arc<Mutex<Vec<String>>>,
    }

    fn bearer_ok(headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {TOKEN}"))
    }

    async fn get_object(State(store): State<FakeStore>, headers: HeaderMap) -> Response {
        if !bearer_ok(&headers) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        match store.object.lock().unwrap().clone() {
            Some(body) => body.into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn put_object(
        State(store): State<FakeStore>,
        headers: HeaderMap,
        body: String,
    ) -> StatusCode {
        if !bearer_ok(&headers) {
            return StatusCode::UNAUTHORIZED;
        }
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        store.content_types.lock().unwrap().push(content_type);
        *store.object.lock().unwrap() = Some(body);
        StatusCode::OK
    }

    async fn spawn_store() -> (String, FakeStore) {
        let store = FakeStore::default();
        let app = Router::new()
            .route(
                &format!("/{BLOB_PATHNAME}"),
                get(get_object).put(put_object),
            )
            .with_state(store.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), store)
    }

    fn backend(base: &str, token: &str) -> BlobBackend {
        BlobBackend::new(
            reqwest::Client::new(),
            Some(base.to_string()),
            Some(token.to_string()),
        )
    }

    #[tokio::test]
    async fn missing_object_reads_as_empty() {
        let (base, _) = spawn_store().await;
        assert!(backend(&base, TOKEN).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_puts_json_and_load_reads_it_back() {
        let (base, store) = spawn_store().await;
        let blob = backend(&base, TOKEN);

        let mut content = ContentMap::new();
        content.insert("hero.title".into(), json!("Hi"));
        blob.store(&content).await.unwrap();

        assert_eq!(
            *store.content_types.lock().unwrap(),
            vec!["application/json".to_string()]
        );
        let raw = store.object.lock().unwrap().clone().unwrap();
        assert_eq!(serde_json::from_str::<ContentMap>(&raw).unwrap(), content);
        assert_eq!(blob.load().await.unwrap(), content);
    }

    #[tokio::test]
    async fn rejected_token_surfaces_the_status() {
        let (base, store) = spawn_store().await;
        let blob = backend(&base, "wrong");

        assert!(matches!(
            blob.load().await,
            Err(BackendError::Status(StatusCode::UNAUTHORIZED))
        ));
        assert!(matches!(
            blob.store(&ContentMap::new()).await,
            Err(BackendError::Status(StatusCode::UNAUTHORIZED))
        ));
        assert!(store.object.lock().unwrap().is_none());
    }

    #[test]
    fn missing_token_is_not_ready() {
        let backend = BlobBackend::new(
            reqwest::Client::new(),
            Some("https://blob.example.com".into()),
            Some(String::new()),
        );
        assert!(matches!(backend.ready(), Err(BackendError::NotConfigured(_))));
    }

    #[test]
    fn configured_backend_targets_fixed_pathname() {
        let backend = BlobBackend::new(
            reqwest::Client::new(),
            Some("https://blob.example.com/".into()),
            Some("tok".into()),
        );
        assert!(backend.ready().is_ok());
        let (url, token) = backend.target().unwrap();
        assert_eq!(
            url,
            "https://blob.example.com/click2edit/editable-content.json"
        );
        assert_eq!(token, "tok");
    }
}
