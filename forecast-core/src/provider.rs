use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{error::Result, model::ForecastRequest};

pub mod weatherapi;

pub use weatherapi::WeatherApiClient;

/// Something that can answer a [`ForecastRequest`] with a raw forecast document.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    /// `Ok(None)` means the service answered but had no data for this
    /// location (non-success status); the caller skips it. `Err` is fatal.
    async fn fetch(&self, request: &ForecastRequest) -> Result<Option<Value>>;
}
