//! Observation log for GeoWeather.
//!
//! An append-only store of time-stamped weather observations plus the two
//! aggregation queries the presentation layer consumes: latest observation
//! per location and full history for one location.

pub mod error;
pub mod store;
pub mod types;

pub use error::ObservationStoreError;
pub use store::ObservationStore;
pub use types::Observation;
