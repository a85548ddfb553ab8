use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{error::FetchError, model::Weather};

use super::{WeatherGateway, classify_status};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`WeatherGateway`] backed by the OpenWeather current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherGateway {
    base_url: String,
    http: Client,
}

impl OpenWeatherGateway {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Point the gateway at another endpoint, e.g. a proxy or a mock server.
    /// `timeout` bounds each request end to end.
    ///
    /// Fails only if the TLS backend can't be initialised.
    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherGateway {
    async fn fetch(&self, credential: &str, location: &str) -> Result<Weather, FetchError> {
        debug!(location, url = %self.base_url, "requesting current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("q", location), ("appid", credential), ("units", "metric")])
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("request to weather service failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            debug!(location, status = status.as_u16(), "weather service rejected request");
            return Err(classify_status(status.as_u16(), location, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| FetchError::Network(format!("malformed response from weather service: {e}")))
    }
}
