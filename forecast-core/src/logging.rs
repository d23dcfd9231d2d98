//! Log line formatting and subscriber construction.
//!
//! Every line looks like `2023-08-06 12:00:00,123 - INFO - message`. The
//! subscriber is built here but installed by the caller, so tests can scope
//! their own with [`tracing::subscriber::set_default`].

use std::{
    fmt,
    fs::OpenOptions,
    path::Path,
    sync::Mutex,
};

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    layer::SubscriberExt,
    registry::LookupSpan,
};

use crate::error::{ForecastError, Result};

pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// `<timestamp> - <LEVEL> - <message>` event formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashFormat;

impl<S, N> FormatEvent<S, N> for DashFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        write!(writer, "{now} - {} - ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Build a subscriber that appends to `log_file` and mirrors to stdout.
///
/// The level filter is taken from `RUST_LOG`, defaulting to `info`.
pub fn subscriber(log_file: &Path) -> Result<impl Subscriber + Send + Sync + use<>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| ForecastError::io(log_file, e))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(DashFormat)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(DashFormat)
        .with_writer(std::io::stdout);

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer))
}
