//! Registry HTTP client.
//!
//! Builds outbound requests against the code-directory service: consumer
//! identity and call-correlation headers, an optional bearer token from the
//! token-exchange collaborator, bounded retry on transient connection
//! failures, and translation of HTTP-level failures into [`RegistryError`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};
use uuid::Uuid;

use super::auth::{CorrelationProvider, TokenProvider};
use super::error::RegistryError;

/// Header naming the calling application.
const CONSUMER_ID_HEADER: &str = "nav-consumer-id";
/// Header carrying the call-correlation id.
const CALL_ID_HEADER: &str = "nav-call-id";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default number of attempts for transient connection failures.
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Default base delay between retry attempts, grows linearly per attempt.
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Error when required configuration is missing from the environment.
#[derive(Debug, thiserror::Error)]
pub enum RegistryConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the code-directory service
    pub base_url: String,
    /// Application name sent as the consumer-identity header
    pub app_name: String,
    /// Registry client id, used to derive the token audience
    pub client_id: String,
    /// Whether to attach a bearer token (off outside production)
    pub auth_enabled: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum attempts for transient connection failures
    pub retry_attempts: u32,
    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl RegistryConfig {
    /// Create a config with auth disabled and default timeouts/retries.
    pub fn new(base_url: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            app_name: app_name.into(),
            client_id: String::new(),
            auth_enabled: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    /// Enable bearer-token auth against the given registry client id.
    pub fn with_auth(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self.auth_enabled = true;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the retry budget for transient connection failures.
    pub fn with_retry(mut self, attempts: u32, delay_ms: u64) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay_ms = delay_ms;
        self
    }

    /// Read the deployment configuration from the environment.
    ///
    /// Expects `KODEVERK_URL`, `NAIS_APP_NAME` and
    /// `AZURE_APP_KODEVERK_CLIENT_ID`; auth is enabled.
    pub fn from_env() -> Result<Self, RegistryConfigError> {
        let base_url = require_env("KODEVERK_URL")?;
        let app_name = require_env("NAIS_APP_NAME")?;
        let client_id = require_env("AZURE_APP_KODEVERK_CLIENT_ID")?;

        Ok(Self::new(base_url, app_name).with_auth(client_id))
    }
}

fn require_env(name: &'static str) -> Result<String, RegistryConfigError> {
    std::env::var(name).map_err(|_| RegistryConfigError::MissingVar(name))
}

/// HTTP client for the code-directory service.
#[derive(Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    config: RegistryConfig,
    consumer_id: HeaderValue,
    tokens: Arc<dyn TokenProvider>,
    correlation: Arc<dyn CorrelationProvider>,
}

impl RegistryClient {
    /// Create a new registry client.
    ///
    /// The consumer-identity header is validated once here, so individual
    /// calls cannot fail on it.
    pub fn new(
        config: RegistryConfig,
        tokens: Arc<dyn TokenProvider>,
        correlation: Arc<dyn CorrelationProvider>,
    ) -> Result<Self, RegistryError> {
        let consumer_id = HeaderValue::from_str(&config.app_name).map_err(|_| {
            RegistryError::Api {
                status: 0,
                message: format!("application name {:?} is not a valid header value", config.app_name),
            }
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RegistryError::Transport {
                attempts: 0,
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            config,
            consumer_id,
            tokens,
            correlation,
        })
    }

    /// Fetch the raw node tree of a hierarchy.
    pub async fn fetch_hierarchy(&self, hierarchy: &str) -> Result<String, RegistryError> {
        let url = format!("{}/api/v1/hierarki/{}/noder", self.config.base_url, hierarchy);
        self.get_text(&url, &[]).await
    }

    /// Fetch the raw meanings table of a flat code table.
    ///
    /// The language is fixed to Norwegian bokmål, which is what the
    /// place-name decoding expects.
    pub async fn fetch_code_table(&self, table: &str) -> Result<String, RegistryError> {
        let url = format!(
            "{}/api/v1/kodeverk/{}/koder/betydninger",
            self.config.base_url, table
        );
        self.get_text(&url, &[("spraak", "nb")]).await
    }

    /// Issue a GET and return the response body.
    ///
    /// Headers (identity, correlation, bearer) are assembled once per call;
    /// only transient connection failures are retried. Error responses and
    /// empty bodies are translated immediately, never retried.
    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, RegistryError> {
        let headers = self.call_headers().await?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let result = self
                .http
                .get(url)
                .query(query)
                .headers(headers.clone())
                .send()
                .await;

            match result {
                Ok(response) => return self.read_body(url, response).await,
                Err(err) if is_transient(&err) && attempt < self.config.retry_attempts => {
                    warn!(attempt, url, error = %err, "transient registry failure, retrying");
                    tokio::time::sleep(Duration::from_millis(
                        self.config.retry_delay_ms * u64::from(attempt),
                    ))
                    .await;
                }
                Err(err) => {
                    return Err(RegistryError::Transport {
                        attempts: attempt,
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    async fn read_body(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<String, RegistryError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(|e| RegistryError::Transport {
            attempts: 1,
            message: format!("reading response body: {e}"),
        })?;

        if body.is_empty() {
            return Err(RegistryError::EmptyBody);
        }

        debug!(status = status.as_u16(), url, "registry responded");
        Ok(body)
    }

    /// Assemble per-call headers: identity, correlation id and bearer token.
    async fn call_headers(&self) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(CONSUMER_ID_HEADER),
            self.consumer_id.clone(),
        );

        // Reuse the ambient correlation id when it is header-safe,
        // otherwise generate a fresh one for this call.
        let call_id = self
            .correlation
            .current_correlation_id()
            .and_then(|id| HeaderValue::from_str(&id).ok())
            .unwrap_or_else(|| {
                HeaderValue::from_str(&Uuid::new_v4().to_string())
                    .expect("generated uuid is a valid header value")
            });
        headers.insert(HeaderName::from_static(CALL_ID_HEADER), call_id);

        if self.config.auth_enabled {
            let audience = format!("api://{}/.default", self.config.client_id);
            let token = self
                .tokens
                .exchange_token(&audience)
                .await
                .map_err(|e| RegistryError::Token {
                    message: e.to_string(),
                })?;
            let bearer =
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    RegistryError::Token {
                        message: "token is not a valid header value".to_string(),
                    }
                })?;
            headers.insert(AUTHORIZATION, bearer);
        }

        Ok(headers)
    }
}

/// Connection-level failures worth retrying. HTTP error responses never
/// reach this path: they arrive as successful sends and are translated.
fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::auth::{NoAmbientCorrelation, StaticTokenProvider, TokenError};

    use async_trait::async_trait;
    use httpmock::prelude::*;

    struct NoToken;

    #[async_trait]
    impl TokenProvider for NoToken {
        async fn exchange_token(&self, audience: &str) -> Result<String, TokenError> {
            Err(TokenError::new(format!("no token for {audience}")))
        }
    }

    struct FixedCorrelation(&'static str);

    impl CorrelationProvider for FixedCorrelation {
        fn current_correlation_id(&self) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn client(config: RegistryConfig) -> RegistryClient {
        RegistryClient::new(
            config,
            Arc::new(StaticTokenProvider::new("t-123")),
            Arc::new(NoAmbientCorrelation),
        )
        .unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = RegistryConfig::new("http://localhost:8080", "test-app");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.app_name, "test-app");
        assert!(!config.auth_enabled);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
    }

    #[test]
    fn config_builder() {
        let config = RegistryConfig::new("http://localhost:8080", "test-app")
            .with_auth("client-id-1")
            .with_timeout(5)
            .with_retry(2, 10);

        assert!(config.auth_enabled);
        assert_eq!(config.client_id, "client-id-1");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.retry_delay_ms, 10);
    }

    #[test]
    fn config_from_env() {
        std::env::remove_var("KODEVERK_URL");
        std::env::remove_var("NAIS_APP_NAME");
        std::env::remove_var("AZURE_APP_KODEVERK_CLIENT_ID");

        assert!(matches!(
            RegistryConfig::from_env(),
            Err(RegistryConfigError::MissingVar("KODEVERK_URL"))
        ));

        std::env::set_var("KODEVERK_URL", "http://kodeverk.local");
        std::env::set_var("NAIS_APP_NAME", "test-app");
        std::env::set_var("AZURE_APP_KODEVERK_CLIENT_ID", "client-1");

        let config = RegistryConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://kodeverk.local");
        assert!(config.auth_enabled);

        std::env::remove_var("KODEVERK_URL");
        std::env::remove_var("NAIS_APP_NAME");
        std::env::remove_var("AZURE_APP_KODEVERK_CLIENT_ID");
    }

    #[test]
    fn rejects_invalid_app_name() {
        let config = RegistryConfig::new("http://localhost:8080", "bad\nname");
        let result = RegistryClient::new(
            config,
            Arc::new(StaticTokenProvider::new("t")),
            Arc::new(NoAmbientCorrelation),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn sends_identity_and_correlation_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/hierarki/LandkoderSammensattISO2/noder")
                .header("nav-consumer-id", "test-app")
                .header_exists("nav-call-id");
            then.status(200).body("{\"noder\":{}}");
        });

        let client = client(RegistryConfig::new(server.base_url(), "test-app"));
        let body = client.fetch_hierarchy("LandkoderSammensattISO2").await.unwrap();

        assert_eq!(body, "{\"noder\":{}}");
        mock.assert();
    }

    #[tokio::test]
    async fn reuses_ambient_correlation_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/hierarki/LandkoderSammensattISO2/noder")
                .header("nav-call-id", "request-42");
            then.status(200).body("{\"noder\":{}}");
        });

        let client = RegistryClient::new(
            RegistryConfig::new(server.base_url(), "test-app"),
            Arc::new(StaticTokenProvider::new("t")),
            Arc::new(FixedCorrelation("request-42")),
        )
        .unwrap();

        client.fetch_hierarchy("LandkoderSammensattISO2").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_auth_enabled() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/kodeverk/Postnummer/koder/betydninger")
                .query_param("spraak", "nb")
                .header("authorization", "Bearer t-123");
            then.status(200).body("{\"betydninger\":{}}");
        });

        let client = client(
            RegistryConfig::new(server.base_url(), "test-app").with_auth("client-id-1"),
        );
        client.fetch_code_table("Postnummer").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn token_exchange_is_skipped_when_auth_disabled() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/hierarki/LandkoderSammensattISO2/noder");
            then.status(200).body("{\"noder\":{}}");
        });

        // A provider that always fails proves the auth step never runs.
        let client = RegistryClient::new(
            RegistryConfig::new(server.base_url(), "test-app"),
            Arc::new(NoToken),
            Arc::new(NoAmbientCorrelation),
        )
        .unwrap();

        client.fetch_hierarchy("LandkoderSammensattISO2").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn token_failure_surfaces_without_sending() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path_contains("/api/");
            then.status(200).body("{}");
        });

        let client = RegistryClient::new(
            RegistryConfig::new(server.base_url(), "test-app").with_auth("client-id-1"),
            Arc::new(NoToken),
            Arc::new(NoAmbientCorrelation),
        )
        .unwrap();

        let err = client.fetch_hierarchy("LandkoderSammensattISO2").await.unwrap_err();
        assert!(matches!(err, RegistryError::Token { .. }));
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/hierarki/LandkoderSammensattISO2/noder");
            then.status(500).body("boom");
        });

        let client = client(RegistryConfig::new(server.base_url(), "test-app"));
        let err = client.fetch_hierarchy("LandkoderSammensattISO2").await.unwrap_err();

        assert!(matches!(err, RegistryError::Api { status: 500, .. }));
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/kodeverk/Postnummer/koder/betydninger");
            then.status(404).body("no such code table");
        });

        let client = client(RegistryConfig::new(server.base_url(), "test-app"));
        let err = client.fetch_code_table("Postnummer").await.unwrap_err();

        assert!(matches!(err, RegistryError::Api { status: 404, .. }));
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn empty_body_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/hierarki/LandkoderSammensattISO2/noder");
            then.status(200).body("");
        });

        let client = client(RegistryConfig::new(server.base_url(), "test-app"));
        let err = client.fetch_hierarchy("LandkoderSammensattISO2").await.unwrap_err();

        assert!(matches!(err, RegistryError::EmptyBody));
    }

    #[tokio::test]
    async fn connection_failure_exhausts_retry_budget() {
        // Nothing listens on this port, so every attempt fails to connect.
        let config =
            RegistryConfig::new("http://127.0.0.1:9", "test-app").with_retry(3, 1);
        let client = client(config);

        let err = client.fetch_hierarchy("LandkoderSammensattISO2").await.unwrap_err();
        assert!(matches!(err, RegistryError::Transport { attempts: 3, .. }));
    }
}
