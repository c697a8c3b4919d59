//! HTTP client for the booking backend REST API.
//!
//! Handles bearer authentication, timeouts, invalid-certificate opt-in,
//! and status classification. Requests are sent exactly once; callers
//! decide whether a failure is worth repeating.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use sb_core::config::{AppConfig, ServerConfig};
use sb_core::constants;
use sb_core::error::{SbError, SbResult};
use sb_models::TokenPair;

use crate::response::{error_message_from_body, ListResponse};

/// HTTP client for the booking backend.
///
/// Cloning is cheap; clones share the connection pool and the token slot,
/// so a login through one clone authenticates all of them.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    /// Base URL for the API (e.g. "http://localhost:8000/api").
    api_root: String,
    /// Server origin (scheme + host, no path).
    origin: String,
    /// Default request timeout.
    timeout: Duration,
    /// Current access/refresh token pair, if signed in.
    tokens: Arc<RwLock<Option<TokenPair>>>,
}

impl ApiClient {
    /// Create a new ApiClient from server configuration.
    pub fn new(config: &ServerConfig) -> SbResult<Self> {
        let sanitized_address = AppConfig::sanitize_server_address(&config.address);
        if sanitized_address.is_empty() {
            return Err(SbError::MissingConfig("server address".into()));
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_millis(config.api_timeout_ms))
            .connect_timeout(Duration::from_secs(15))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90));

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| SbError::Http(format!("failed to build HTTP client: {e}")))?;

        let origin = derive_origin(&sanitized_address);
        let api_root = format!("{origin}{}", constants::API_PREFIX);

        Ok(Self {
            inner,
            api_root,
            origin,
            timeout: Duration::from_millis(config.api_timeout_ms),
            tokens: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the current API root URL.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Get the server origin.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Install a token pair; subsequent requests carry the access token.
    pub async fn set_tokens(&self, tokens: TokenPair) {
        *self.tokens.write().await = Some(tokens);
        debug!("bearer token installed");
    }

    /// Forget the current token pair.
    pub async fn clear_tokens(&self) {
        *self.tokens.write().await = None;
        debug!("bearer token cleared");
    }

    /// Whether a token pair is installed.
    pub async fn has_token(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// The current access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().map(|t| t.access.clone())
    }

    /// The current token pair, if any.
    pub async fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().await.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_root)
    }

    /// Internal: build a request for the given method and optional JSON body.
    async fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> RequestBuilder {
        let mut builder = self
            .inner
            .request(method, self.url(path))
            .timeout(self.timeout);
        if let Some(token) = self.access_token().await {
            builder = builder.bearer_auth(token);
        }
        if let Some(b) = body {
            builder = builder.json(b);
        }
        builder
    }

    /// Send a request once and classify the outcome.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> SbResult<Response> {
        debug!("{} {}", method, path);
        let response = self
            .build_request(method.clone(), path, body)
            .await
            .send()
            .await
            .map_err(Self::classify_error)?;
        Self::check_status(response).await.inspect_err(|e| {
            warn!("{} {} failed: {}", method, path, e);
        })
    }

    // --- Public HTTP methods ---

    /// Execute a GET request.
    pub async fn get(&self, path: &str) -> SbResult<Response> {
        self.send(Method::GET, path, None).await
    }

    /// Execute a GET request with query parameters.
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> SbResult<Response> {
        debug!("GET {} (query)", path);
        let response = self
            .build_request(Method::GET, path, None)
            .await
            .query(query)
            .send()
            .await
            .map_err(Self::classify_error)?;
        Self::check_status(response).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> SbResult<Response> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Execute a PUT request with a JSON body.
    pub async fn put(&self, path: &str, body: &serde_json::Value) -> SbResult<Response> {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// Execute a PATCH request with a JSON body.
    pub async fn patch(&self, path: &str, body: &serde_json::Value) -> SbResult<Response> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    /// Execute a DELETE request.
    pub async fn delete(&self, path: &str) -> SbResult<()> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    // --- Response helpers ---

    /// Deserialize a response body.
    pub async fn parse_response<T: DeserializeOwned>(response: Response) -> SbResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| SbError::Serialization(format!("failed to parse response: {e}")))
    }

    /// Convenience: GET + parse.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SbResult<T> {
        let resp = self.get(path).await?;
        Self::parse_response(resp).await
    }

    /// Convenience: GET a list endpoint, plain or paginated.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> SbResult<Vec<T>> {
        let list: ListResponse<T> = self.get_json(path).await?;
        Ok(list.into_items())
    }

    /// Convenience: GET a list endpoint with query parameters.
    pub async fn get_list_with_query<T, Q>(&self, path: &str, query: &Q) -> SbResult<Vec<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let resp = self.get_with_query(path, query).await?;
        let list: ListResponse<T> = Self::parse_response(resp).await?;
        Ok(list.into_items())
    }

    /// Convenience: POST + parse.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> SbResult<T> {
        let resp = self.post(path, body).await?;
        Self::parse_response(resp).await
    }

    /// Convenience: PUT + parse.
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> SbResult<T> {
        let resp = self.put(path, body).await?;
        Self::parse_response(resp).await
    }

    /// Convenience: PATCH + parse.
    pub async fn patch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> SbResult<T> {
        let resp = self.patch(path, body).await?;
        Self::parse_response(resp).await
    }

    /// Check the HTTP status code and convert to SbError if needed.
    async fn check_status(response: Response) -> SbResult<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message_from_body(&body).unwrap_or_else(|| status.to_string());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SbError::AuthFailed(message));
        }

        Err(SbError::ServerError {
            status: status.as_u16(),
            message,
        })
    }

    /// Classify a reqwest error into an SbError variant.
    fn classify_error(e: reqwest::Error) -> SbError {
        if e.is_timeout() {
            SbError::Timeout(e.to_string())
        } else if e.is_connect() {
            SbError::Http(format!("connection failed: {e}"))
        } else {
            SbError::Http(e.to_string())
        }
    }
}

/// Serialize a request body, mapping failures into SbError.
pub(crate) fn to_body<T: Serialize>(value: &T) -> SbResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| SbError::Serialization(e.to_string()))
}

/// Derive the origin (scheme + host + optional port) from a server address.
fn derive_origin(address: &str) -> String {
    if let Ok(url) = reqwest::Url::parse(address) {
        let host = url.host_str().unwrap_or("localhost");
        match url.port() {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        }
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(address: &str) -> ServerConfig {
        ServerConfig {
            address: address.into(),
            realtime_url: String::new(),
            api_timeout_ms: 30_000,
            accept_invalid_certs: false,
        }
    }

    #[test]
    fn test_derive_origin() {
        assert_eq!(
            derive_origin("https://book.example.com/api"),
            "https://book.example.com"
        );
        assert_eq!(
            derive_origin("http://192.168.1.100:8000"),
            "http://192.168.1.100:8000"
        );
    }

    #[test]
    fn test_api_root() {
        let client = ApiClient::new(&test_config("localhost:8000/")).unwrap();
        assert_eq!(client.origin(), "http://localhost:8000");
        assert_eq!(client.api_root(), "http://localhost:8000/api");
    }

    #[test]
    fn test_empty_address_rejected() {
        let err = ApiClient::new(&test_config("  ")).err().unwrap();
        assert!(matches!(err, SbError::MissingConfig(_)));
    }

    #[tokio::test]
    async fn test_token_slot_shared_between_clones() {
        let client = ApiClient::new(&test_config("http://localhost:8000")).unwrap();
        let clone = client.clone();
        client
            .set_tokens(TokenPair {
                access: "a".into(),
                refresh: "r".into(),
            })
            .await;
        assert_eq!(clone.access_token().await.as_deref(), Some("a"));
        clone.clear_tokens().await;
        assert!(!client.has_token().await);
    }
}
