//! Enriches a raw provider payload into a storable observation.

use chrono::{DateTime, Utc};

use geoweather_locations::GeoPoint;
use geoweather_observations::Observation;
use geoweather_provider::WeatherPayload;

/// Pure enrichment step: attach the canonical location key and the caller's
/// clock reading, and derive the point from payload coordinates when present.
///
/// `fetched_at` always comes from the caller, never from the payload. Missing
/// optional fields stay `None`; the point is never fabricated.
pub fn transform(
    payload: WeatherPayload,
    location_key: &str,
    fetched_at: DateTime<Utc>,
) -> Observation {
    let point = payload
        .coordinates
        .map(|(longitude, latitude)| GeoPoint::new(longitude, latitude));

    Observation {
        location_key: location_key.to_string(),
        fetched_at,
        temperature: payload.temperature,
        condition: payload.condition,
        humidity: payload.humidity,
        wind_speed: payload.wind_speed,
        point,
        raw: payload.raw,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn payload(value: serde_json::Value) -> WeatherPayload {
        WeatherPayload::from_value(value).unwrap()
    }

    #[test]
    fn test_fetched_at_comes_from_caller_not_payload() {
        let fetched_at = DateTime::from_timestamp_millis(42_000).unwrap();
        // Payload carries its own timestamp field; it must be ignored.
        let obs = transform(
            payload(serde_json::json!({"dt": 1_700_000_000})),
            "Lagos",
            fetched_at,
        );

        assert_eq!(obs.fetched_at, fetched_at);
    }

    #[test]
    fn test_attaches_location_key_and_point() {
        let obs = transform(
            payload(serde_json::json!({
                "coord": {"lon": 3.3792, "lat": 6.5244},
                "main": {"temp": 30.0}
            })),
            "Lagos",
            Utc::now(),
        );

        assert_eq!(obs.location_key, "Lagos");
        assert_eq!(obs.point, Some(GeoPoint::new(3.3792, 6.5244)));
        assert_eq!(obs.temperature, Some(30.0));
    }

    #[test]
    fn test_missing_coordinates_leave_point_unset() {
        let obs = transform(
            payload(serde_json::json!({"main": {"temp": 30.0}})),
            "Lagos",
            Utc::now(),
        );

        assert!(obs.point.is_none());
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let fetched_at = DateTime::from_timestamp_millis(10_000).unwrap();
        let value = serde_json::json!({
            "weather": [{"description": "haze"}],
            "main": {"temp": 28.5, "humidity": 80}
        });

        let first = transform(payload(value.clone()), "Lagos", fetched_at);
        let second = transform(payload(value), "Lagos", fetched_at);

        assert_eq!(first, second);
    }

    #[test]
    fn test_raw_payload_carried_verbatim() {
        let value = serde_json::json!({"main": {"temp": 1.0}, "extra": {"nested": true}});
        let obs = transform(payload(value.clone()), "Lagos", Utc::now());

        assert_eq!(obs.raw, value);
    }
}
