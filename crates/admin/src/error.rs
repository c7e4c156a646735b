//! Unified error handling for the admin client.

use kiosk_admin_core::{SortError, ValidationErrors};
use thiserror::Error;

/// Errors surfaced by the store, cache and services.
///
/// The type is `Clone` so that one failed request can be handed to every
/// caller that joined it.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Transport or connectivity failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status, or a `success: false` envelope.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client-side form constraint failure; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Sort engine setup failed.
    #[error("Sort error: {0}")]
    Sort(#[from] SortError),

    /// Request cannot be built from the given arguments.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl ClientError {
    /// Whether a later revalidation may succeed without user action.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Short message for a toast notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Server is unreachable, check your connection".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Parse(_) => "Unexpected response from server".to_string(),
            Self::Validation(errors) => errors.to_string(),
            Self::Sort(e) => e.to_string(),
            Self::InvalidRequest(message) => message.clone(),
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
