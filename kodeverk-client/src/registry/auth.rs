//! Collaborator seams for outbound authentication and correlation.
//!
//! Token exchange and ambient request correlation are owned by the
//! embedding application; the registry client only needs these two
//! capabilities.

use async_trait::async_trait;

/// Error from the external token-exchange service.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TokenError {
    message: String,
}

impl TokenError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Supplies a bearer token for a given audience.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange for an access token scoped to `audience`.
    async fn exchange_token(&self, audience: &str) -> Result<String, TokenError>;
}

/// Supplies the ambient call-correlation id, if one exists.
///
/// When an incoming request carries a correlation id, outbound registry
/// calls reuse it; otherwise the client generates a fresh one per call.
pub trait CorrelationProvider: Send + Sync {
    fn current_correlation_id(&self) -> Option<String>;
}

/// Correlation provider for contexts without ambient request state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAmbientCorrelation;

impl CorrelationProvider for NoAmbientCorrelation {
    fn current_correlation_id(&self) -> Option<String> {
        None
    }
}

/// Token provider returning a pre-issued token.
///
/// Useful where the platform injects a long-lived token, and in tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn exchange_token(&self, _audience: &str) -> Result<String, TokenError> {
        Ok(self.token.clone())
    }
}
