//! Current weather via an OpenWeatherMap-compatible API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Url};
use serde::Deserialize;
use switchboard_core::{Capability, CapabilityError, CapabilityResult};
use tracing::debug;

/// Default endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Settings for [`WeatherService`].
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// API key sent as `appid`.
    pub api_key: String,
    /// Endpoint URL.
    pub base_url: String,
    /// Language of the description.
    pub lang: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: "ru".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherPayload {
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: Option<String>,
}

/// Looks up the current weather for a city.
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: Client,
    endpoint: Url,
    config: WeatherConfig,
}

impl WeatherService {
    /// Creates the service. Fails if the endpoint is not a valid URL.
    pub fn new(config: WeatherConfig) -> CapabilityResult<Self> {
        let endpoint = Url::parse(&config.base_url).map_err(|e| {
            CapabilityError::transport(format!("invalid weather endpoint '{}': {e}", config.base_url))
        })?;
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CapabilityError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    fn request_url(&self, location: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("appid", &self.config.api_key)
            .append_pair("q", location)
            .append_pair("lang", &self.config.lang)
            .append_pair("units", "metric");
        url
    }

    /// Extracts the first condition description from a response body.
    fn describe(location: &str, body: &str) -> CapabilityResult<String> {
        let payload: WeatherPayload = serde_json::from_str(body)
            .map_err(|e| CapabilityError::transport(format!("malformed weather response: {e}")))?;

        payload
            .weather
            .into_iter()
            .find_map(|c| c.description)
            .ok_or_else(|| {
                CapabilityError::validation(format!("нет данных о погоде для «{location}»"))
            })
    }
}

#[async_trait]
impl Capability for WeatherService {
    fn name(&self) -> &'static str {
        "weather"
    }

    async fn handle(&self, input: &str) -> CapabilityResult<String> {
        let location = input.trim();
        if location.is_empty() {
            return Err(CapabilityError::validation("укажите название города"));
        }

        debug!(location, "Requesting weather");
        let resp = self
            .client
            .get(self.request_url(location))
            .send()
            .await
            .map_err(|e| CapabilityError::transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CapabilityError::transport(format!(
                "HTTP {} from weather API",
                status.as_u16()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CapabilityError::transport(e.to_string()))?;
        let description = Self::describe(location, &body)?;

        Ok(format!("Погода в {location}: {description}."))
    }
}
