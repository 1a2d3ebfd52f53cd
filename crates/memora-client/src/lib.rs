//! Shared HTTP client for the Memora remote CRUD service.
//!
//! Provides the [`RemoteClient`] seam trait and a minimal reqwest-backed
//! implementation with configurable auth (Bearer token or X-API-Key).
//! Model types hold the client behind an `Arc<dyn RemoteClient>` and never
//! construct it themselves.

pub mod traits;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub use traits::{ClientError, ClientResult, Record, RemoteClient};

/// Authentication strategy for the remote service.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// API version prefix (e.g. "/api/v0"). Set MEMORA_API_VERSION to match the server.
pub fn api_prefix() -> String {
    let version = std::env::var("MEMORA_API_VERSION").unwrap_or_else(|_| "v0".to_string());
    format!("/api/{}", version)
}

/// Decode a response body, treating an empty body as JSON `null`.
fn decode_body(body: &str) -> ClientResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

/// HTTP implementation of [`RemoteClient`] with configurable auth.
///
/// Namespaces map onto REST collections: `{base}{prefix}/{namespace}` for
/// list/create, `{base}{prefix}/{namespace}/{uuid}` for the per-record verbs.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    prefix: String,
    auth: Auth,
}

impl HttpClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            prefix: api_prefix(),
            auth,
        })
    }

    /// Create client from environment: MEMORA_API_URL (or API_URL), MEMORA_API_KEY (or API_KEY).
    /// Uses X-API-Key auth. Loads a `.env` file if one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("MEMORA_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let api_key = std::env::var("MEMORA_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .context("Missing API key. Set MEMORA_API_KEY or API_KEY")?;

        Self::new(base_url, Auth::XApiKey(api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for a whole collection.
    fn collection_url(&self, namespace: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            self.prefix,
            urlencoding::encode(namespace)
        )
    }

    /// URL for one record.
    fn record_url(&self, namespace: &str, uuid: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(namespace),
            urlencoding::encode(uuid)
        )
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    /// Send a prepared request and decode the JSON body, surfacing non-2xx
    /// responses as [`ClientError::Status`].
    async fn execute(&self, request: reqwest::RequestBuilder) -> ClientResult<Value> {
        let response = self.apply_auth(request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode_body(&body)
    }
}

#[async_trait]
impl RemoteClient for HttpClient {
    async fn retrieve(&self, namespace: &str, uuid: &str) -> ClientResult<Record> {
        let url = self.record_url(namespace, uuid);
        let value = self.execute(self.client.get(&url)).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn list(&self, namespace: &str) -> ClientResult<Vec<Record>> {
        let url = self.collection_url(namespace);
        let value = self.execute(self.client.get(&url)).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn create(&self, namespace: &str, values: &Record) -> ClientResult<Value> {
        let url = self.collection_url(namespace);
        self.execute(self.client.post(&url).json(values)).await
    }

    async fn update(&self, namespace: &str, uuid: &str, values: &Record) -> ClientResult<Value> {
        let url = self.record_url(namespace, uuid);
        self.execute(self.client.put(&url).json(values)).await
    }

    async fn remove(&self, namespace: &str, uuid: &str) -> ClientResult<Value> {
        let url = self.record_url(namespace, uuid);
        self.execute(self.client.delete(&url)).await
    }
}
