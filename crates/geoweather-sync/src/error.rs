//! Sync run error types.

use thiserror::Error;

/// Run-fatal failures.
///
/// Per-location fetch and sink problems are not errors at this level: they
/// are recorded in the [`SyncRunResult`](crate::SyncRunResult) and the run
/// keeps going. The only way a run fails outright is not being able to
/// enumerate locations at all.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to enumerate locations: {0}")]
    ListLocations(String),
}

impl SyncError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ListLocations(_) => {
                "The location store could not be read. Load locations first and check the store path."
            }
        }
    }
}
