//! Location loader error types.

use thiserror::Error;

/// Batch-level failures of a location load run.
///
/// Row-level problems (missing fields, unparseable coordinates) are not
/// errors: they are counted in the [`LoadReport`](crate::LoadReport) and the
/// batch continues.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read location source: {0}")]
    SourceRead(String),

    #[error("Failed to persist location batch: {0}")]
    StoreWrite(String),
}

impl LoadError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::SourceRead(_) => "The location file could not be read. Check the path and format.",
            Self::StoreWrite(_) => {
                "Saving locations failed and the batch was rolled back. Try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = LoadError::SourceRead("no such file".into());
        assert!(err.user_message().contains("could not be read"));

        let err = LoadError::StoreWrite("disk full".into());
        assert!(err.user_message().contains("rolled back"));
    }
}
