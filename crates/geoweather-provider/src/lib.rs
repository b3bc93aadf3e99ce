//! External weather provider client for GeoWeather.
//!
//! Fetches current conditions keyed by coordinates and decodes the response
//! into a typed payload exactly once, at this boundary. Downstream code never
//! re-derives field presence from raw JSON.

pub mod client;
pub mod error;
pub mod payload;

pub use client::WeatherClient;
pub use error::FetchError;
pub use payload::WeatherPayload;

use async_trait::async_trait;

/// Abstraction over the external provider so the sync pipeline can run
/// against a fake in tests.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions for a coordinate pair.
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherPayload, FetchError>;
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherPayload, FetchError> {
        self.current_conditions(latitude, longitude).await
    }
}
