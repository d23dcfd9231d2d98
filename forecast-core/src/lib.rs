//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Credentials handling (`config.ini`)
//! - The forecast source abstraction and the WeatherAPI.com client
//! - Flattening forecast documents into CSV rows and appending them
//! - Log formatting
//!
//! It is used by `forecast-cli`, but the pipeline can be driven by any
//! [`ForecastSource`].

pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod sink;

pub use config::Config;
pub use error::ForecastError;
pub use extract::extract_rows;
pub use model::{ApiKey, ForecastRequest, WeatherRow};
pub use pipeline::{Pipeline, RunSummary};
pub use provider::{ForecastSource, WeatherApiClient};
pub use sink::CsvSink;
