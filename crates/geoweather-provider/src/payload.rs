//! Typed view of the provider's current-conditions response.

use serde::Deserialize;

/// The fields this system consumes, plus the verbatim payload.
///
/// Optional fields stay optional all the way through: absence degrades to
/// `None` here and is never patched up downstream.
#[derive(Debug, Clone)]
pub struct WeatherPayload {
    /// Temperature in the requested unit system
    pub temperature: Option<f64>,
    /// Short condition description, e.g. "light rain"
    pub condition: Option<String>,
    pub humidity: Option<u8>,
    pub wind_speed: Option<f64>,
    /// Provider-reported coordinates as (longitude, latitude), when present
    pub coordinates: Option<(f64, f64)>,
    /// Verbatim response body, opaque to downstream consumers
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiCoord {
    lon: Option<f64>,
    lat: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiMain {
    temp: Option<f64>,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiCurrentResponse {
    coord: Option<ApiCoord>,
    #[serde(default)]
    weather: Vec<ApiCondition>,
    #[serde(default)]
    main: ApiMain,
    #[serde(default)]
    wind: ApiWind,
}

impl WeatherPayload {
    /// Decode a raw response body.
    ///
    /// The body must be a JSON object; anything else is the caller's cue to
    /// report a malformed response. Missing fields are fine.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let decoded: ApiCurrentResponse = serde_json::from_value(value.clone())?;

        let coordinates = decoded.coord.and_then(|c| match (c.lon, c.lat) {
            (Some(lon), Some(lat)) => Some((lon, lat)),
            _ => None,
        });

        let condition = decoded
            .weather
            .into_iter()
            .next()
            .and_then(|w| w.description);

        Ok(Self {
            temperature: decoded.main.temp,
            condition,
            humidity: decoded.main.humidity,
            wind_speed: decoded.wind.speed,
            coordinates,
            raw: value,
        })
    }
}
