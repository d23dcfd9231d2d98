use serde::Deserialize as _;
use serde_json::Value;
use tracing::info;

use crate::{
    error::{ForecastError, Result},
    model::{NOT_AVAILABLE, WaForecastDocument, WeatherRow},
};

/// Flatten one forecast.json document into one row per forecast day,
/// keeping the order the API returned them in.
///
/// Missing leaves become `None`; a missing `location` or
/// `forecast.forecastday` skeleton is a [`ForecastError::Structure`].
pub fn extract_rows(document: &Value) -> Result<Vec<WeatherRow>> {
    let parsed = WaForecastDocument::deserialize(document).map_err(ForecastError::Structure)?;

    let city = parsed.location.name;
    let country = parsed.location.country;

    info!(
        "Fetching weather information for {}:",
        city.as_deref().unwrap_or(NOT_AVAILABLE)
    );

    let rows = parsed
        .forecast
        .forecastday
        .into_iter()
        .map(|entry| WeatherRow {
            date: entry.date,
            country: country.clone(),
            city: city.clone(),
            avg_temp_c: entry.day.avgtemp_c,
            max_temp_c: entry.day.maxtemp_c,
            min_temp_c: entry.day.mintemp_c,
            humidity: entry.day.avghumidity,
            air_quality_co: entry.day.air_quality.co,
        })
        .inspect(|row| {
            let [date, country, city, avg, max, min, humidity, co] = row.to_record();
            info!(
                "Date:{date}, Country: {country}, City: {city}, Avg Temp: {avg} C, \
                 Max_Temp: {max} C, Min_Temp: {min}, Humidity: {humidity}, Air Quality (Co2): {co}"
            );
        })
        .collect();

    Ok(rows)
}
