//! Error types for upstream polling.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures while talking to the master.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("error decoding response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while minting or exchanging a login token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("error parsing private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("error creating login token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("login failed: {0}")]
    Login(#[source] Box<ClientError>),
}
