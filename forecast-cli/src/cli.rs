use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use forecast_core::{
    ApiKey, Config, CsvSink, Pipeline, WeatherApiClient, config::DEFAULT_CONFIG_FILE,
    logging::{self, DEFAULT_LOG_FILE},
    sink::DEFAULT_OUTPUT_FILE,
};
use inquire::{Password, PasswordDisplayMode};
use tracing::error;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "forecast",
    version,
    about = "Fetch weather information for multiple locations into a CSV file",
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// List of locations (e.g. city names).
    #[arg(short, long, num_args = 1.., required = true)]
    pub locations: Vec<String>,

    /// Number of days for which to fetch weather data.
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: u32,

    /// INI file holding the `[WeatherAPI]` api_key.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// CSV file rows are appended to.
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// File progress and error messages are appended to.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com API key in the config file.
    Configure {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match &self.command {
            Some(Command::Configure { config }) => configure(config),
            None => self.fetch().await,
        }
    }

    async fn fetch(&self) -> anyhow::Result<()> {
        let subscriber = logging::subscriber(&self.log_file).context("Error setting up logging")?;
        tracing::subscriber::set_global_default(subscriber).context("Error setting up logging")?;

        self.fetch_logged().await
    }

    /// Runs the fetch, logging a fatal error at ERROR before handing it back.
    async fn fetch_logged(&self) -> anyhow::Result<()> {
        let result = self.fetch_all().await;
        if let Err(err) = &result {
            error!("{err:#}");
        }
        result
    }

    async fn fetch_all(&self) -> anyhow::Result<()> {
        let config = Config::load(&self.config).context("Error reading config file")?;

        let pipeline = Pipeline::new(
            WeatherApiClient::with_base_url(config.base_url()),
            CsvSink::new(&self.output),
        );

        pipeline
            .run(&config.api_key, &self.locations, self.days)
            .await
            .context("Error fetching weather data")?;

        Ok(())
    }
}

fn configure(path: &Path) -> anyhow::Result<()> {
    // Keep a base_url override from an earlier config, if any.
    let base_url = Config::load(path).ok().and_then(|cfg| cfg.base_url);

    let key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    let config = Config {
        api_key: ApiKey::new(key),
        base_url,
    };
    config.save(path)?;

    println!("Saved API key to {}", path.display());
    Ok(())
}
