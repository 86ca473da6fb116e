use std::path::PathBuf;
use std::time::Duration;

use picker_shared::geocode::{GeocoderConfig, DEFAULT_OPENCAGE_URL};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub dist_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub geocoder: GeocoderConfig,
    pub geocode_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            "GEOCODE_TIMEOUT_SECS",
            lookup("GEOCODE_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;

        let api_key = lookup("OPENCAGE_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("OPENCAGE_API_KEY"))?;
        let endpoint = lookup("OPENCAGE_URL").unwrap_or_else(|| DEFAULT_OPENCAGE_URL.to_string());

        Ok(Config {
            port,
            dist_dir: PathBuf::from(lookup("DIST_DIR").unwrap_or_else(|| "dist".to_string())),
            assets_dir: PathBuf::from(lookup("ASSETS_DIR").unwrap_or_else(|| "assets".to_string())),
            geocoder: GeocoderConfig::new(api_key).with_endpoint(endpoint),
            geocode_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
