use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use geoweather_locations::GeoPoint;

/// One time-stamped weather reading for a location.
///
/// Created once by the sink and never updated or deleted. `fetched_at` is
/// the pipeline's clock reading at fetch time, not anything the provider
/// reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Soft reference to `Location.name`
    pub location_key: String,
    pub fetched_at: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub humidity: Option<u8>,
    pub wind_speed: Option<f64>,
    /// Provider-reported point, when the payload carried coordinates
    pub point: Option<GeoPoint>,
    /// Verbatim provider payload
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_serializes_with_optional_fields_absent() {
        let obs = Observation {
            location_key: "Lagos".to_string(),
            fetched_at: DateTime::from_timestamp_millis(10_000).unwrap(),
            temperature: None,
            condition: None,
            humidity: None,
            wind_speed: None,
            point: None,
            raw: serde_json::Value::Null,
        };

        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["location_key"], "Lagos");
        assert!(json["temperature"].is_null());
    }
}
