//! Form API error types.

use thiserror::Error;

/// Errors that can occur when talking to the form API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested form does not exist.
    #[error("form not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}
