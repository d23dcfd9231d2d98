use std::path::PathBuf;

use thiserror::Error;

/// Every failure that ends a run.
///
/// Non-200 answers from the API are not errors: they are logged and the
/// location is skipped.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Missing or unusable credentials file.
    #[error("Configuration error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// The request never produced an HTTP response.
    #[error("Failed to reach forecast API for '{location}': {source}")]
    Transport {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not valid JSON.
    #[error("Failed to parse forecast JSON for '{location}': {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON lacks the `location` / `forecast.forecastday` skeleton.
    #[error("Unexpected forecast document: {0}")]
    Structure(#[source] serde_json::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ForecastError {
    pub fn config<S: Into<String>>(path: impl Into<PathBuf>, message: S) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
