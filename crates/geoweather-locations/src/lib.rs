//! Location catalog for GeoWeather.
//!
//! Provides the canonical location entity, the CSV loader that cleans and
//! deduplicates raw location rows, and the SQLite-backed geospatial store.

pub mod error;
pub mod geo;
pub mod loader;
pub mod store;
pub mod types;

pub use error::LoadError;
pub use geo::GeoPoint;
pub use loader::{LoadReport, LocationLoader};
pub use store::LocationStore;
pub use types::{Location, RawLocationRecord};
