//! Provider error types.

use thiserror::Error;

/// Per-location fetch failures.
///
/// Never fatal to a sync run: the orchestrator records the cause against the
/// location and moves on.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    MalformedBody(String),
}

impl FetchError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) => "Could not reach the weather provider. Check your connection.",
            Self::Status { status, .. } if *status == 401 || *status == 403 => {
                "The weather provider rejected the API key. Check your configuration."
            }
            Self::Status { status, .. } if *status == 429 => {
                "The weather provider rate limit was hit. Try again later."
            }
            Self::Status { .. } => "The weather provider request failed. Try again later.",
            Self::MalformedBody(_) => "The weather provider sent an unreadable response.",
        }
    }

    /// Whether a later run may succeed without configuration changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedBody(_) => false,
        }
    }
}
