//! Sync pipeline for GeoWeather.
//!
//! Drives fetch → transform → store across the known locations with a
//! bounded worker pool, and reports per-location outcomes without letting
//! individual failures abort the run.

pub mod error;
pub mod orchestrator;
pub mod report;
pub mod transform;

pub use error::SyncError;
pub use orchestrator::{LocationSource, ObservationSink, SyncOptions, SyncOrchestrator};
pub use report::{FailureReason, SyncFailure, SyncRunResult};
pub use transform::transform;
