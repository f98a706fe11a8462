//! HTTP client for the weather API (current conditions and location search).

use std::sync::Arc;

use async_trait::async_trait;
use nimbus_core::error::ReqwestErrorExt;
use nimbus_core::{ApiConfig, WeatherError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::source::{LocationSearch, WeatherSource};
use crate::types::{LocationCandidate, WeatherRecord};

const CURRENT_PATH: &str = "v1/current.json";
const SEARCH_PATH: &str = "v1/search.json";

/// Weather API client. Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    /// Build a client from the API section of the configuration.
    ///
    /// # Errors
    /// Returns `Network` if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| e.into_weather_error())?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
    ) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .query(&[("q", query), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("Request to {} failed: {}", path, e);
                WeatherError::network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned status {}", path, status);
            return Err(WeatherError::http(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WeatherError::network(e.to_string()))?;

        decode_body(&body)
    }
}

/// Decode a 2xx body; an empty or `null` body means there is no data.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, WeatherError> {
    let text = std::str::from_utf8(body).map_err(|e| WeatherError::Decode(e.to_string()))?;
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(WeatherError::NotFound);
    }

    serde_json::from_str(trimmed).map_err(|e| WeatherError::Decode(e.to_string()))
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let record: WeatherRecord = self.get_json(CURRENT_PATH, city).await?;
        tracing::info!(
            "Fetched weather for {}, {}",
            record.location.name,
            record.location.country
        );
        Ok(record)
    }
}

#[async_trait]
impl LocationSearch for WeatherApiClient {
    #[instrument(skip(self), level = "info")]
    async fn search_locations(
        &self,
        query: &str,
    ) -> Result<Vec<LocationCandidate>, WeatherError> {
        let candidates: Vec<LocationCandidate> = self.get_json(SEARCH_PATH, query).await?;
        tracing::info!("Search returned {} locations", candidates.len());
        Ok(candidates)
    }
}
