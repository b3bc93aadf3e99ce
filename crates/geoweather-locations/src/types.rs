use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Canonical geospatial entity: a named point with fixed coordinates.
///
/// Created and updated only by the loader; read-only for the sync pipeline
/// and the aggregation queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique, case-preserved display name
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Point geometry derived from the coordinate pair. Never stored
    /// independently of the coordinates; recomputed whenever they change.
    pub fn geometry(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// One row of the raw tabular source, before cleaning.
///
/// All fields are read as strings first so that type coercion is an explicit,
/// counted step rather than something the reader guesses at.
#[derive(Debug, Clone, Default)]
pub struct RawLocationRecord {
    pub name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}
