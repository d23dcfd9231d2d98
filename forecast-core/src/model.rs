use std::fmt;

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use serde_json::Value;

/// Placeholder written to the CSV for any field the API did not return.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column names of the CSV file, in order.
pub const CSV_HEADER: [&str; 8] = [
    "Date",
    "Country",
    "City",
    "Avg Temperature (C)",
    "Max Temperature (C)",
    "Min Temperature (C)",
    "Humidity",
    "Air Quality Co2",
];

/// WeatherAPI.com key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub location: String,
    pub days: u32,
    pub api_key: ApiKey,
}

/// One forecast day, flattened. The unit persisted to CSV.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherRow {
    pub date: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub avg_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub air_quality_co: Option<f64>,
}

impl WeatherRow {
    /// Render the row as CSV fields, substituting [`NOT_AVAILABLE`] for gaps.
    pub fn to_record(&self) -> [String; 8] {
        [
            text(&self.date),
            text(&self.country),
            text(&self.city),
            number(self.avg_temp_c),
            number(self.max_temp_c),
            number(self.min_temp_c),
            number(self.humidity),
            number(self.air_quality_co),
        ]
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

// Typed view over the forecast.json response. Only `location` and
// `forecast.forecastday` are structural; every leaf may be missing, null or
// of an unexpected type, and then reads as `None` / default.

#[derive(Debug, Deserialize)]
pub(crate) struct WaForecastDocument {
    pub location: WaLocation,
    pub forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WaLocation {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WaForecast {
    pub forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WaForecastDay {
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub day: WaDay,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WaDay {
    #[serde(default, deserialize_with = "lenient_number")]
    pub avgtemp_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub maxtemp_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub mintemp_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avghumidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub air_quality: WaAirQuality,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WaAirQuality {
    #[serde(default, deserialize_with = "lenient_number")]
    pub co: Option<f64>,
}

/// Number or numeric string; anything else is `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(deserialize_option_number_from_string::<f64, _>(value).unwrap_or(None))
}

/// Strings as-is, numbers and booleans in their JSON spelling.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Nested object that falls back to its default when null or mistyped.
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_render_as_not_available() {
        let row = WeatherRow {
            date: Some("2023-08-06".into()),
            city: Some("London".into()),
            avg_temp_c: Some(18.0),
            ..Default::default()
        };

        assert_eq!(
            row.to_record(),
            ["2023-08-06", "N/A", "London", "18", "N/A", "N/A", "N/A", "N/A"]
        );
    }

    #[test]
    fn fractional_values_keep_their_digits() {
        let row = WeatherRow {
            avg_temp_c: Some(17.4),
            air_quality_co: Some(0.8),
            ..Default::default()
        };

        let record = row.to_record();
        assert_eq!(record[3], "17.4");
        assert_eq!(record[7], "0.8");
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
        assert_eq!(key.as_str(), "super-secret");
    }
}
