//! Drives fetch → transform → store across a batch of locations.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use geoweather_locations::{Location, LocationStore};
use geoweather_observations::{Observation, ObservationStore, ObservationStoreError};
use geoweather_provider::WeatherProvider;

use crate::error::SyncError;
use crate::report::{FailureReason, SyncRunResult};
use crate::transform::transform;

/// Where completed observations go. The store implements this; tests swap in
/// failing fakes.
pub trait ObservationSink: Send + Sync {
    fn append(&self, observation: &Observation) -> Result<(), ObservationStoreError>;
}

impl ObservationSink for ObservationStore {
    fn append(&self, observation: &Observation) -> Result<(), ObservationStoreError> {
        ObservationStore::append(self, observation)
    }
}

/// Where the batch of known locations comes from.
pub trait LocationSource: Send + Sync {
    fn list(&self) -> anyhow::Result<Vec<Location>>;
}

impl LocationSource for LocationStore {
    fn list(&self) -> anyhow::Result<Vec<Location>> {
        self.list_all()
    }
}

/// Knobs for one run. All of these come from configuration, not policy
/// hardcoded here.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Maximum locations processed per run
    pub batch_cap: usize,
    /// Worker pool size
    pub workers: usize,
    /// Overall run deadline; in-flight locations finish, nothing new starts
    pub deadline: Option<Duration>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_cap: 100,
            workers: 5,
            deadline: None,
        }
    }
}

/// Per-location result reported through the aggregation channel.
struct LocationOutcome {
    location_key: String,
    outcome: Result<(), FailureReason>,
}

/// Runs the sync pipeline: each location moves pending → fetched →
/// transformed → stored, or → failed at whichever step broke.
///
/// Workers share nothing mutable except the work queue; outcomes flow
/// through a single channel and are applied to the counters one completed
/// location at a time.
pub struct SyncOrchestrator {
    provider: Arc<dyn WeatherProvider>,
    sink: Arc<dyn ObservationSink>,
    options: SyncOptions,
}

impl SyncOrchestrator {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        sink: Arc<dyn ObservationSink>,
        options: SyncOptions,
    ) -> Self {
        Self {
            provider,
            sink,
            options,
        }
    }

    /// Enumerate locations from the source, then run.
    ///
    /// The only run-fatal failure: the source cannot be read at all.
    pub async fn run_from_source(
        &self,
        source: &dyn LocationSource,
    ) -> Result<SyncRunResult, SyncError> {
        let locations = source
            .list()
            .map_err(|e| SyncError::ListLocations(e.to_string()))?;
        Ok(self.run(locations).await)
    }

    /// Run over an explicit batch of locations.
    pub async fn run(&self, locations: Vec<Location>) -> SyncRunResult {
        self.run_with_cancellation(locations, CancellationToken::new())
            .await
    }

    /// Run with external cancellation. Cancelling stops dequeuing within one
    /// scheduling tick; locations already in flight complete and are counted.
    pub async fn run_with_cancellation(
        &self,
        locations: Vec<Location>,
        cancel: CancellationToken,
    ) -> SyncRunResult {
        let batch: VecDeque<Location> = locations
            .into_iter()
            .take(self.options.batch_cap)
            .collect();

        let mut result = SyncRunResult {
            attempted: batch.len() as u32,
            ..SyncRunResult::default()
        };

        if batch.is_empty() {
            return result;
        }

        let deadline = self.options.deadline.map(|d| Instant::now() + d);
        let queue = Arc::new(Mutex::new(batch));
        let (tx, mut rx) = mpsc::unbounded_channel::<LocationOutcome>();

        for _ in 0..self.options.workers.max(1) {
            let queue = Arc::clone(&queue);
            let provider = Arc::clone(&self.provider);
            let sink = Arc::clone(&self.sink);
            let tx = tx.clone();
            let cancel = cancel.clone();

            tokio::spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            break;
                        }
                    }

                    // Guard dropped before any await point.
                    let location = { queue.lock().pop_front() };
                    let Some(location) = location else { break };

                    let outcome =
                        process_one(provider.as_ref(), sink.as_ref(), &location).await;
                    if tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        // Single aggregation point: counters update atomically per location.
        while let Some(outcome) = rx.recv().await {
            match outcome.outcome {
                Ok(()) => result.record_success(),
                Err(reason) => {
                    tracing::warn!(
                        location_key = %outcome.location_key,
                        %reason,
                        "Location sync failed"
                    );
                    result.record_failure(outcome.location_key, reason);
                }
            }
        }

        // Whatever the workers never dequeued (deadline or cancellation).
        for location in queue.lock().drain(..) {
            result.record_failure(location.name, FailureReason::NotAttempted);
        }

        tracing::info!(
            attempted = result.attempted,
            succeeded = result.succeeded,
            failed = result.failed,
            "Sync run complete"
        );

        result
    }
}

async fn process_one(
    provider: &dyn WeatherProvider,
    sink: &dyn ObservationSink,
    location: &Location,
) -> LocationOutcome {
    tracing::debug!(location_key = %location.name, "Syncing location");

    let outcome = match provider.fetch(location.latitude, location.longitude).await {
        Ok(payload) => {
            let observation = transform(payload, &location.name, Utc::now());
            sink.append(&observation)
                .map_err(|e| FailureReason::Sink(e.to_string()))
        }
        Err(e) => Err(FailureReason::Fetch(e.to_string())),
    };

    LocationOutcome {
        location_key: location.name.clone(),
        outcome,
    }
}
