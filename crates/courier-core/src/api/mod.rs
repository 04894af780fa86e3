//! HTTP client for the mail gateway.
//!
//! All endpoints live behind a single [`ApiClient`]; authenticated calls
//! attach the session token as a bearer header. Tokens are never logged or
//! displayed in full.

pub mod auth;
pub mod gmail;
pub mod types;

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Config;
use types::ErrorBody;

/// Authorization rejection (401) from the gateway.
///
/// Carried inside anyhow chains; callers that need to distinguish session
/// expiry from ordinary failures detect it with `err.downcast_ref`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthorized;

impl fmt::Display for Unauthorized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the gateway rejected the session token (HTTP 401)")
    }
}

impl std::error::Error for Unauthorized {}

/// Client for the mail gateway API.
///
/// No Debug impl: the bearer token must not leak into logs.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl ApiClient {
    /// Builds a client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config.effective_base_url(), config.request_timeout())
    }

    /// Builds a client for an explicit base URL (no trailing slash).
    pub fn with_base_url(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: None,
        })
    }

    /// Returns a copy of this client carrying a bearer token.
    pub fn with_bearer(&self, token: &str) -> Self {
        let mut client = self.clone();
        client.bearer = Some(token.to_string());
        client
    }

    /// Sets or clears the bearer token on this client.
    pub fn set_bearer(&mut self, token: Option<String>) {
        self.bearer = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }
        req
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    /// Resolves a gateway response into a typed payload.
    ///
    /// 401 maps to the [`Unauthorized`] sentinel; other non-2xx statuses are
    /// turned into an error carrying the gateway's `{error}` message when one
    /// is present, the raw body otherwise.
    pub(crate) async fn handle<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
        let status = response.status();
        tracing::debug!(%status, path, "gateway response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(Unauthorized.into());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or(body);
            anyhow::bail!("Gateway request to {path} failed (HTTP {status}): {message}");
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse gateway response from {path}"))
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::types::ProfileResponse;
    use super::*;

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::with_base_url(&format!("{}/api", server.uri()), None).unwrap()
    }

    /// Bearer token is attached to authenticated requests.
    #[tokio::test]
    async fn test_bearer_header_attached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"user": {"id": 1, "email": "a@b.com", "name": "A"}}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).with_bearer("tok-123");
        let resp = client.get("/profile").send().await.unwrap();
        let profile: ProfileResponse = ApiClient::handle("/profile", resp).await.unwrap();
        assert_eq!(profile.user.email, "a@b.com");
    }

    /// 401 resolves to the Unauthorized sentinel, detectable via downcast.
    #[tokio::test]
    async fn test_401_maps_to_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/profile"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server).with_bearer("stale");
        let resp = client.get("/profile").send().await.unwrap();
        let err = ApiClient::handle::<ProfileResponse>("/profile", resp)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<Unauthorized>().is_some());
    }

    /// The gateway's {error} message is extracted into the failure.
    #[tokio::test]
    async fn test_error_body_message_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/gmail/status"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_raw(r#"{"error": "Gmail not connected"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let resp = client.get("/gmail/status").send().await.unwrap();
        let err = ApiClient::handle::<ProfileResponse>("/gmail/status", resp)
            .await
            .unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("Gmail not connected"), "got: {message}");
        assert!(message.contains("400"), "got: {message}");
    }

    /// Token masking.
    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("jwt-abcdefghijklmnopqrst"), "jwt-abcdefgh...");
        assert_eq!(mask_token("short"), "***");
    }
}
