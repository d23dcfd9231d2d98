use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::{
    config::DEFAULT_BASE_URL,
    error::{ForecastError, Result},
    model::ForecastRequest,
};

use super::ForecastSource;

/// Client for the WeatherAPI.com `forecast.json` endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast.json", self.base_url.trim_end_matches('/'))
    }
}

impl Default for WeatherApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ForecastSource for WeatherApiClient {
    async fn fetch(&self, request: &ForecastRequest) -> Result<Option<Value>> {
        let transport = |source: reqwest::Error| ForecastError::Transport {
            location: request.location.clone(),
            source,
        };

        info!("Requesting {}-day forecast for {}", request.days, request.location);

        let res = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("key", request.api_key.as_str()),
                ("q", request.location.as_str()),
                ("days", &request.days.to_string()),
                ("aqi", "yes"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        if status != reqwest::StatusCode::OK {
            // Best-effort, only feeds the log line.
            let body = res.text().await.unwrap_or_default();
            error!(
                "No data stored for {}: forecast request failed with status {}: {}",
                request.location,
                status.as_u16(),
                truncate_body(&body),
            );
            return Ok(None);
        }

        let body = res.text().await.map_err(transport)?;

        let parsed = serde_json::from_str(&body).map_err(|source| ForecastError::Parse {
            location: request.location.clone(),
            source,
        })?;

        Ok(Some(parsed))
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
