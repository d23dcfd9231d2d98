use std::{
    fs::OpenOptions,
    io::{Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    error::{ForecastError, Result},
    model::{CSV_HEADER, WeatherRow},
};

pub const DEFAULT_OUTPUT_FILE: &str = "weather_data.csv";

/// Append-only CSV file of [`WeatherRow`]s, shared across runs.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `rows` in order, writing the header first if the file is empty.
    ///
    /// The whole batch is encoded in memory and handed to the append-mode
    /// handle in a single write, so an encoding failure never leaves half a
    /// row on disk. Returns the number of rows appended.
    pub fn append(&self, rows: &[WeatherRow]) -> Result<usize> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ForecastError::io(&self.path, e))?;

        // O_APPEND handles start at offset 0; the real size is at the end.
        let position = file
            .seek(SeekFrom::End(0))
            .map_err(|e| ForecastError::io(&self.path, e))?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        if position == 0 {
            writer.write_record(CSV_HEADER).map_err(|e| self.csv_error(e))?;
        }
        for row in rows {
            writer
                .write_record(row.to_record())
                .map_err(|e| self.csv_error(e))?;
        }
        let buffer = writer
            .into_inner()
            .map_err(|e| ForecastError::io(&self.path, e.into_error()))?;

        file.write_all(&buffer)
            .and_then(|()| file.flush())
            .map_err(|e| ForecastError::io(&self.path, e))?;

        info!(
            "Saved {} rows to {}{}",
            rows.len(),
            self.path.display(),
            if position == 0 { " (new file, header written)" } else { "" }
        );

        Ok(rows.len())
    }

    /// Read back every data row (header excluded) as raw strings.
    pub fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| self.csv_error(e))?;

        reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_owned).collect())
                    .map_err(|e| self.csv_error(e))
            })
            .collect()
    }

    fn csv_error(&self, err: csv::Error) -> ForecastError {
        ForecastError::io(&self.path, err.into())
    }
}
