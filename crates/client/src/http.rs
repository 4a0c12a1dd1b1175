//! Shared HTTP client.
//!
//! Wraps a pooled [`reqwest::Client`] with the API base URL and the
//! session [`TokenStore`], attaching the bearer token to authenticated
//! requests and mapping error bodies of the form `{"detail": ...}` onto
//! [`ApiError::Api`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use sentinel_core::error::CoreError;
use sentinel_core::session::TokenStore;

/// Query string pairs, appended in order.
pub type Query<'a> = &'a [(&'a str, String)];

/// Message used when an error body cannot be decoded at all.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered successfully but without the record we needed.
    #[error("Empty response: {0}")]
    EmptyResponse(&'static str),

    /// A lookup or check on data the API returned failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    /// HTTP status for [`ApiError::Api`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Unwrap an optional body, failing with [`ApiError::EmptyResponse`].
pub fn require<T>(value: Option<T>, what: &'static str) -> Result<T, ApiError> {
    value.ok_or(ApiError::EmptyResponse(what))
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`).
    pub fn new(
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url, tokens)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for sharing one connection pool across base URLs).
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Resolve `path` against the base URL and append `query`.
    ///
    /// Absolute URLs in `path` replace the base entirely.
    pub fn build_url(&self, path: &str, query: Query<'_>) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send a request and decode the JSON answer.
    ///
    /// Returns `Ok(None)` for `204 No Content`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: Query<'_>,
        with_auth: bool,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path, query)?;
        tracing::debug!(%method, %url, with_auth, "API request");

        let mut builder = self
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if with_auth {
            if let Some(bearer) = self.bearer() {
                builder = builder.header(reqwest::header::AUTHORIZATION, bearer);
            }
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        Self::parse_response(response).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
        with_auth: bool,
    ) -> Result<Option<T>, ApiError> {
        self.request::<T, ()>(Method::GET, path, None, query, with_auth)
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B, with_auth: bool) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), &[], with_auth)
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B, with_auth: bool) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body), &[], with_auth)
            .await
    }

    pub async fn patch<T, B>(
        &self,
        path: &str,
        body: &B,
        query: Query<'_>,
        with_auth: bool,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body), query, with_auth)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
        with_auth: bool,
    ) -> Result<Option<T>, ApiError> {
        self.request::<T, ()>(Method::DELETE, path, None, query, with_auth)
            .await
    }

    // ---- private helpers ----

    /// Bearer header value for the current, non-expired session.
    fn bearer(&self) -> Option<String> {
        match self.tokens.load() {
            Ok(session) => session.map(|s| s.bearer()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read session, sending request unauthenticated");
                None
            }
        }
    }

    /// Map a non-2xx response onto [`ApiError::Api`], otherwise decode
    /// the body (or `None` for 204).
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<T>, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<serde_json::Value>().await {
                Ok(body) => detail_message(&body, status),
                Err(_) => UNKNOWN_ERROR.to_string(),
            };
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json::<T>().await?))
    }
}

/// Extract the human-readable message from an error body.
fn detail_message(body: &serde_json::Value, status: StatusCode) -> String {
    match body.get("detail") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        Some(serde_json::Value::Null) | None => format!("Error {}", status.as_u16()),
        Some(serde_json::Value::String(_)) => format!("Error {}", status.as_u16()),
        // Validation errors carry a list of issues.
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::session::MemoryTokenStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Arc::new(MemoryTokenStore::new()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn build_url_appends_query_in_order() {
        let api = client("http://localhost:8000");
        let url = api
            .build_url(
                "/api/eventos",
                &[("limit", "200".into()), ("id_conexion", "4".into())],
            )
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/eventos?limit=200&id_conexion=4");
    }

    #[test]
    fn build_url_without_query_has_no_question_mark() {
        let api = client("http://localhost:8000/");
        let url = api.build_url("/api/oficinas", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/oficinas");
    }

    #[test]
    fn build_url_keeps_absolute_urls() {
        let api = client("http://localhost:8000");
        let url = api.build_url("https://cdn.example.com/a.json", &[]).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/a.json");
    }

    #[test]
    fn detail_message_prefers_detail_string() {
        let body = serde_json::json!({"detail": "Credenciales inválidas"});
        assert_eq!(detail_message(&body, StatusCode::UNAUTHORIZED), "Credenciales inválidas");

        let body = serde_json::json!({"error": "x"});
        assert_eq!(detail_message(&body, StatusCode::BAD_GATEWAY), "Error 502");
    }
}
