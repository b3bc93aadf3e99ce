//! Per-run outcome accounting.

/// Why one location failed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Provider call failed (network, non-success status, malformed body)
    Fetch(String),
    /// Observation could not be appended to the log
    Sink(String),
    /// Run ended (deadline or cancellation) before this location was dequeued
    NotAttempted,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(cause) => write!(f, "fetch failed: {}", cause),
            Self::Sink(cause) => write!(f, "store failed: {}", cause),
            Self::NotAttempted => write!(f, "not attempted"),
        }
    }
}

/// One failed location with its recorded cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub location_key: String,
    pub reason: FailureReason,
}

/// Ephemeral summary of one sync run. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncRunResult {
    /// Locations the run took on (after the batch cap)
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub failures: Vec<SyncFailure>,
}

impl SyncRunResult {
    /// Record a completed location. Counters update together, per location.
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Record a failed location with its cause.
    pub fn record_failure(&mut self, location_key: impl Into<String>, reason: FailureReason) {
        self.failed += 1;
        self.failures.push(SyncFailure {
            location_key: location_key.into(),
            reason,
        });
    }
}
