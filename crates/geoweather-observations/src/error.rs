//! Observation store error types.

use thiserror::Error;

/// Failures of the observation log.
///
/// `Append` failures are per-location from the orchestrator's point of view;
/// query failures surface to whoever asked for the aggregation. "No data" is
/// never an error: empty results are the correct representation of an empty
/// log.
#[derive(Error, Debug)]
pub enum ObservationStoreError {
    #[error("Observation store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to append observation: {0}")]
    Append(String),

    #[error("Observation query failed: {0}")]
    Query(String),
}

impl ObservationStoreError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "The observation store could not be opened.",
            Self::Append(_) => "Saving an observation failed. It will be retried next run.",
            Self::Query(_) => "Reading observations failed. Try again.",
        }
    }
}
