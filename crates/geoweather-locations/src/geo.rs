//! Point geometry derived from coordinate pairs.

use serde::{Deserialize, Serialize};

/// A point on the map, GeoJSON coordinate order (longitude first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Serialize as a GeoJSON `Point` value.
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "Point",
            "coordinates": [self.longitude, self.latitude],
        })
    }

    /// Parse a GeoJSON `Point` value; returns `None` for anything else.
    pub fn from_geojson(value: &serde_json::Value) -> Option<Self> {
        if value.get("type").and_then(|t| t.as_str()) != Some("Point") {
            return None;
        }
        let coords = value.get("coordinates")?.as_array()?;
        let longitude = coords.first()?.as_f64()?;
        let latitude = coords.get(1)?.as_f64()?;
        Some(Self {
            longitude,
            latitude,
        })
    }
}

/// Check that a coordinate pair lies in the valid WGS84 ranges.
pub fn coords_in_range(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_geojson_round_trip() {
        let point = GeoPoint::new(-74.006, 40.7128);
        let value = point.to_geojson();
        let parsed = GeoPoint::from_geojson(&value).unwrap();

        assert_eq!(parsed, point);
    }

    #[test]
    fn test_geojson_coordinate_order_is_lon_lat() {
        let point = GeoPoint::new(3.3792, 6.5244);
        let value = point.to_geojson();

        let coords = value["coordinates"].as_array().unwrap();
        assert_eq!(coords[0].as_f64().unwrap(), 3.3792);
        assert_eq!(coords[1].as_f64().unwrap(), 6.5244);
    }

    #[test]
    fn test_from_geojson_rejects_non_point() {
        let value = serde_json::json!({"type": "LineString", "coordinates": [[0.0, 0.0]]});
        assert!(GeoPoint::from_geojson(&value).is_none());
    }

    #[test]
    fn test_coords_in_range() {
        assert!(coords_in_range(0.0, 0.0));
        assert!(coords_in_range(90.0, 180.0));
        assert!(coords_in_range(-90.0, -180.0));
        assert!(!coords_in_range(90.1, 0.0));
        assert!(!coords_in_range(0.0, -180.5));
    }
}
