//! HTTP client for the provider's current-conditions endpoint.

use tracing::instrument;

use crate::error::FetchError;
use crate::payload::WeatherPayload;

const PROVIDER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_UNITS: &str = "metric";

pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    units: String,
}

impl WeatherClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, PROVIDER_API_BASE)
    }

    /// Client against a non-default endpoint (alternate deployment or mock).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            units: DEFAULT_UNITS.to_string(),
        }
    }

    /// Override the unit system requested from the provider.
    pub fn units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    /// Fetch current conditions for a coordinate pair.
    ///
    /// Any non-success response, network failure, or non-object body comes
    /// back as a [`FetchError`]; individual failures never panic or abort
    /// anything beyond this one call.
    #[instrument(skip(self), level = "debug")]
    pub async fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherPayload, FetchError> {
        let url = format!("{}/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string().as_str()),
                ("lon", longitude.to_string().as_str()),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedBody(e.to_string()))?;

        if !value.is_object() {
            return Err(FetchError::MalformedBody(
                "response body is not a JSON object".to_string(),
            ));
        }

        WeatherPayload::from_value(value).map_err(|e| FetchError::MalformedBody(e.to_string()))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let truncated: String = body.chars().take(MAX).collect();
        format!("{}...", truncated)
    } else {
        body.to_string()
    }
}
