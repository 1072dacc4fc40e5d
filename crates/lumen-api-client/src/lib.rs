//! HTTP client for the Lumen API.
//!
//! Attaches `Authorization: Bearer <token>` from an injected [`TokenProvider`], sends
//! JSON or multipart requests against a base URL, and turns every response outside
//! 200-299 into one [`ApiError`] carrying the server's message. The CLI uses this
//! client directly.

pub mod error;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::{ApiError, DEFAULT_REQUEST_ERROR, DEFAULT_UPLOAD_ERROR};
pub use token::{FileTokenStore, MemoryTokenStore, StaticToken, TokenProvider, TokenStoreError};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Base URL from the environment: LUMEN_API_URL, then API_URL, then the local default.
pub fn api_url_from_env() -> String {
    std::env::var("LUMEN_API_URL")
        .or_else(|_| std::env::var("API_URL"))
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Options for a JSON request. Defaults to a bodiless GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// Applied last, so they override the defaults and the auth header.
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// HTTP client for the Lumen API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.tokens.token().is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Create client with the base URL from the environment.
    pub fn from_env(tokens: Arc<dyn TokenProvider>) -> Result<Self, ApiError> {
        Self::new(api_url_from_env(), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Empty without a token, otherwise exactly `Authorization: Bearer <token>`.
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(token) = self.tokens.token().filter(|t| !t.is_empty()) else {
            return headers;
        };
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => tracing::warn!("Stored token is not a valid header value; sending unauthenticated"),
        }
        headers
    }

    /// Headers of a JSON request: content type, then auth, then the caller's, last
    /// write wins.
    pub fn json_headers(&self, overrides: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in self.auth_headers().iter().chain(overrides.iter()) {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    /// Headers set explicitly on an upload. No content type: the transport adds it with
    /// the multipart boundary.
    pub fn upload_headers(&self) -> HeaderMap {
        self.auth_headers()
    }

    /// Send a JSON request and parse the JSON response.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint);
        let mut request = self
            .client
            .request(options.method.clone(), &url)
            .headers(self.json_headers(&options.headers));

        // Serialized by hand so a caller-supplied Content-Type is kept.
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        tracing::debug!(method = %options.method, url = %url, "API request");
        let response = request.send().await?;
        Self::parse_response(response, DEFAULT_REQUEST_ERROR).await
    }

    /// GET a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request_json(endpoint, RequestOptions::new(Method::GET))
            .await
    }

    /// POST a JSON body and parse the JSON response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request_json(endpoint, RequestOptions::new(Method::POST).json(body)?)
            .await
    }

    /// POST a multipart form and parse the JSON response.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        self.upload_with_method(endpoint, form, Method::POST).await
    }

    /// Send a multipart form with the given method.
    pub async fn upload_with_method<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
        method: Method,
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint);
        tracing::debug!(method = %method, url = %url, "API upload");

        let response = self
            .client
            .request(method, &url)
            .headers(self.upload_headers())
            .multipart(form)
            .send()
            .await?;
        Self::parse_response(response, DEFAULT_UPLOAD_ERROR).await
    }

    async fn parse_response<T: DeserializeOwned>(
        response: Response,
        default_message: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            // An unreadable body is treated like an empty one.
            let body = response.bytes().await.unwrap_or_default();
            let message = error::error_message(&body, default_message);
            tracing::debug!(status = %status, message = %message, "API request failed");
            return Err(ApiError::Http { status, message });
        }

        let body = response.bytes().await?;
        // No body (e.g. 204) parses as JSON null.
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        Ok(serde_json::from_slice(body)?)
    }

    /// Raw client for custom requests. Caller must apply auth via `auth_headers`.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
