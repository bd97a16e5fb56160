use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:2038";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    /// `None` means requests may hang forever, same as the browser client.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub events_page_size: u32,
    pub username_debounce: Duration,
    pub search_debounce: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        let base_url = parse_base_url("API_BASE_URL", &raw_base)?;

        let timeout = lookup("API_TIMEOUT_SECS")
            .map(|v| parse_number::<u64>("API_TIMEOUT_SECS", &v))
            .transpose()?
            .map(Duration::from_secs);

        let events_page_size = lookup("EVENTS_PAGE_SIZE")
            .map(|v| parse_number::<u32>("EVENTS_PAGE_SIZE", &v))
            .transpose()?
            .unwrap_or(50);

        let debounce_ms = lookup("USERNAME_CHECK_DEBOUNCE_MS")
            .map(|v| parse_number::<u64>("USERNAME_CHECK_DEBOUNCE_MS", &v))
            .transpose()?
            .unwrap_or(500);

        let search_ms = lookup("DIRECTORY_SEARCH_DEBOUNCE_MS")
            .map(|v| parse_number::<u64>("DIRECTORY_SEARCH_DEBOUNCE_MS", &v))
            .transpose()?
            .unwrap_or(300);

        Ok(Self {
            api: ApiConfig { base_url, timeout },
            events_page_size,
            username_debounce: Duration::from_millis(debounce_ms),
            search_debounce: Duration::from_millis(search_ms),
        })
    }
}

pub fn parse_base_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let err = || ConfigError::BaseUrl {
        name,
        value: value.to_string(),
    };
    let url = Url::parse(value.trim()).map_err(|_| err())?;
    if url.cannot_be_a_base() {
        return Err(err());
    }
    Ok(url)
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Number {
        name,
        value: value.to_string(),
    })
}
