//! Error types for the operadoras API client.
//!
//! # Design
//! Any non-2xx response collapses into `Http`, whose display text is exactly
//! the message derived from the backend's `detail` field (or the generic
//! `Erro {status}` fallback). Views show that text to the user as-is, so no
//! prefix is added.

use thiserror::Error;

/// Errors returned by `OperadorasClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// A 2xx body was not valid JSON for the expected type.
    #[error("deserialization failed: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// The configured origin could not be used to build request URLs.
    #[error("invalid origin: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status of the failed response, if the error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
