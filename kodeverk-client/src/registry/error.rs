//! Registry client error types.

use super::decode::DecodeError;

/// Errors from the registry HTTP client.
///
/// Raw transport errors never cross this boundary: they are translated to
/// message strings so the error stays `Clone` and can be shared between
/// callers that collapsed onto a single in-flight fetch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Connection-level failure after the retry budget was spent
    #[error("registry unreachable after {attempts} attempt(s): {message}")]
    Transport { attempts: u32, message: String },

    /// Registry answered with a client or server error status
    #[error("registry returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Registry answered 2xx with an empty body
    #[error("registry returned an empty response body")]
    EmptyBody,

    /// The token-exchange collaborator could not supply a bearer token
    #[error("token exchange failed: {message}")]
    Token { message: String },

    /// Response body did not match the expected shape
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
