use tracing::{info, warn};

use crate::{
    error::Result,
    extract::extract_rows,
    model::{ApiKey, ForecastRequest},
    provider::ForecastSource,
    sink::CsvSink,
};

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub locations: usize,
    pub skipped: usize,
    pub rows_written: usize,
}

/// Fetch → extract → append, one location at a time.
#[derive(Debug)]
pub struct Pipeline<S> {
    source: S,
    sink: CsvSink,
}

impl<S: ForecastSource> Pipeline<S> {
    pub fn new(source: S, sink: CsvSink) -> Self {
        Self { source, sink }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Process `locations` in the order given. The first error aborts the
    /// run; rows appended for earlier locations stay on disk.
    pub async fn run(&self, api_key: &ApiKey, locations: &[String], days: u32) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for location in locations {
            summary.locations += 1;

            let request = ForecastRequest {
                location: location.clone(),
                days,
                api_key: api_key.clone(),
            };

            let Some(document) = self.source.fetch(&request).await? else {
                summary.skipped += 1;
                continue;
            };

            let rows = extract_rows(&document)?;
            if rows.is_empty() {
                warn!("Forecast for {location} contained no days");
                continue;
            }

            summary.rows_written += self.sink.append(&rows)?;
        }

        info!(
            "Processed {} locations ({} without data), {} rows written to {}",
            summary.locations,
            summary.skipped,
            summary.rows_written,
            self.sink.path().display()
        );

        Ok(summary)
    }
}
