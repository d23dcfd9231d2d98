use std::{collections::HashMap, fs, path::Path};

use config::{File, FileFormat, Value};
use ini::{EscapePolicy, Ini, WriteOption};

use crate::{
    error::{ForecastError, Result},
    model::ApiKey,
};

pub const DEFAULT_CONFIG_FILE: &str = "config.ini";
pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

const SECTION: &str = "WeatherAPI";
const API_KEY: &str = "api_key";
const BASE_URL: &str = "base_url";

/// Credentials stored in the INI config file.
///
/// Example:
/// ```ini
/// [WeatherAPI]
/// api_key = 0123456789abcdef
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: ApiKey,

    /// Overrides the API root, e.g. to point at a local stub.
    pub base_url: Option<String>,
}

impl Config {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: None,
        }
    }

    /// Load the `[WeatherAPI]` section from `path`.
    ///
    /// Section and key names are matched case-insensitively. A missing file,
    /// section or key, or a blank key, is an error: without a key every
    /// request would be rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let source = File::from(path).format(FileFormat::Ini).required(true);

        let root: HashMap<String, Value> = config::Config::builder()
            .add_source(source)
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| ForecastError::config(path, e.to_string()))?;

        let section = lookup(root, SECTION)
            .ok_or_else(|| ForecastError::config(path, format!("missing [{SECTION}] section")))?
            .into_table()
            .map_err(|e| ForecastError::config(path, format!("[{SECTION}] is not a section: {e}")))?;

        let mut section: HashMap<String, Value> = section.into_iter().collect();

        let api_key = take_string(&mut section, API_KEY, path)?
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ForecastError::config(path, format!("missing '{API_KEY}' in [{SECTION}]"))
            })?;

        let base_url = take_string(&mut section, BASE_URL, path)?
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            api_key: ApiKey::new(api_key.trim()),
            base_url,
        })
    }

    /// Write the config back to `path` as INI, replacing the file.
    ///
    /// INI-reserved characters (`;`, `#`, `=`, `:`) are escaped so the key
    /// loads back unchanged; control characters and quotes are rejected.
    pub fn save(&self, path: &Path) -> Result<()> {
        let key = self.api_key.as_str();
        if key.trim().is_empty() {
            return Err(ForecastError::config(path, format!("refusing to save an empty '{API_KEY}'")));
        }
        if key.chars().any(|c| c.is_control() || c == '"' || c == '\'') {
            return Err(ForecastError::config(
                path,
                format!("'{API_KEY}' contains control or quote characters"),
            ));
        }

        let mut ini = Ini::new();
        ini.with_section(Some(SECTION)).set(API_KEY, key.trim());
        if let Some(url) = &self.base_url {
            ini.with_section(Some(SECTION)).set(BASE_URL, url.as_str());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ForecastError::io(parent, e))?;
        }

        let options = WriteOption {
            escape_policy: EscapePolicy::Reserved,
            ..Default::default()
        };
        ini.write_to_file_opt(path, options)
            .map_err(|e| ForecastError::io(path, e))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

fn lookup(map: HashMap<String, Value>, name: &str) -> Option<Value> {
    map.into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn take_string(
    section: &mut HashMap<String, Value>,
    name: &str,
    path: &Path,
) -> Result<Option<String>> {
    let key = section.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned();

    key.and_then(|k| section.remove(&k))
        .map(|value| {
            value
                .into_string()
                .map_err(|e| ForecastError::config(path, format!("'{name}' is not a string: {e}")))
        })
        .transpose()
}
