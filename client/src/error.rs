//! Error type of the async client.

use operadoras_core::ApiError;
use thiserror::Error;

/// Errors that can occur when calling the operadoras API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The server answered, but with an error status or an unreadable body.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ClientError {
    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => err.status(),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
