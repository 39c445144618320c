use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::{StorageAdapter, StorageError};
use crate::content::{ContentMap, into_content};

/// Header carrying the plaintext editing password on requests to the endpoint.
pub const PASSWORD_HEADER: &str = "x-editable-password";

/// HTTP client with a cookie store, for sharing between
/// [`crate::edit_mode::RemoteAuthorizer`] and [`HttpAdapter`].
///
/// The handshake's session cookie only reaches later writes when both use a
/// client built this way; a plain `reqwest::Client::new()` drops it.
pub fn cookie_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().cookie_store(true).build()
}

/// Storage adapter talking to a remote content endpoint over HTTP.
///
/// Reads are `GET <url>`, writes are `PUT <url>` with the full map as body.
/// Writes are authorized either by [`HttpAdapter::with_password`] or by the
/// session cookie of a [`cookie_client`] shared with the authorizer.
#[derive(Clone)]
pub struct HttpAdapter {
    client: reqwest::Client,
    url: String,
    password: Option<String>,
}

impl HttpAdapter {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            password: None,
        }
    }

    /// Send `password` in the password header on every request.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.password = (!password.is_empty()).then_some(password);
        self
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(method, &self.url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(pw) = &self.password {
            req = req.header(PASSWORD_HEADER, pw);
        }
        req
    }
}

#[async_trait]
impl StorageAdapter for HttpAdapter {
    async fn load(&self) -> Result<ContentMap, StorageError> {
        let res = match self.request(reqwest::Method::GET).send().await {
            Ok(res) => res,
            Err(e) => {
                tracing::warn!("Content fetch from {} failed: {}", self.url, e);
                return Ok(ContentMap::new());
            }
        };
        if !res.status().is_success() {
            tracing::warn!("Content fetch from {} returned {}", self.url, res.status());
            return Ok(ContentMap::new());
        }
        match res.json::<serde_json::Value>().await {
            Ok(value) => Ok(into_content(value)),
            Err(e) => {
                tracing::warn!("Content from {} is not JSON: {}", self.url, e);
                Ok(ContentMap::new())
            }
        }
    }

    async fn save(&self, content: &ContentMap) -> Result<(), StorageError> {
        let body = serde_json::to_vec(content)?;
        let res = self.request(reqwest::Method::PUT).body(body).send().await?;
        if !res.status().is_success() {
            return Err(StorageError::Status(res.status()));
        }
        Ok(())
    }
}
