//! Client configuration: endpoint, HTTP timeouts and conversion polling.
//!
//! Defaults match the public API. [`ClientConfig::from_env`] overlays
//! `SCRIBD_*` environment variables; [`ClientConfig::validate`] runs before a
//! client is built.

use std::time::Duration;

use url::Url;

use crate::request::ApiError;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.scribd.com/api";

/// Default HTTP connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout (60 seconds; uploads can be large).
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// Default delay between conversion status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of non-terminal statuses tolerated before giving up.
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 100;

const BASE_URL_ENV: &str = "SCRIBD_BASE_URL";
const CONNECT_TIMEOUT_ENV: &str = "SCRIBD_CONNECT_TIMEOUT_SECS";
const READ_TIMEOUT_ENV: &str = "SCRIBD_READ_TIMEOUT_SECS";
const POLL_INTERVAL_ENV: &str = "SCRIBD_POLL_INTERVAL_MS";
const POLL_MAX_ATTEMPTS_ENV: &str = "SCRIBD_POLL_MAX_ATTEMPTS";

/// Settings for a [`ScribdClient`](crate::ScribdClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API endpoint; `?api_key=` is appended per request.
    pub base_url: String,
    /// HTTP connect timeout in seconds (1..=3600).
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds (1..=3600).
    pub read_timeout_secs: u64,
    /// Delay between conversion status checks.
    pub poll_interval: Duration,
    /// Non-terminal statuses tolerated before a conversion times out (>= 1).
    pub poll_max_attempts: u32,
    /// Start a background conversion poller after each successful upload.
    pub watch_conversions: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            watch_conversions: false,
        }
    }
}

impl ClientConfig {
    /// Returns the defaults with a different endpoint.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Returns defaults overlaid with `SCRIBD_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when a variable is set but unparseable or
    /// the resulting configuration fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(base_url) = env_value(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(secs) = env_parsed::<u64>(CONNECT_TIMEOUT_ENV)? {
            config.connect_timeout_secs = secs;
        }
        if let Some(secs) = env_parsed::<u64>(READ_TIMEOUT_ENV)? {
            config.read_timeout_secs = secs;
        }
        if let Some(millis) = env_parsed::<u64>(POLL_INTERVAL_ENV)? {
            config.poll_interval = Duration::from_millis(millis);
        }
        if let Some(attempts) = env_parsed::<u32>(POLL_MAX_ATTEMPTS_ENV)? {
            config.poll_max_attempts = attempts;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validates ranges and the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::config("base_url", format!("{e}: {}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::config(
                "base_url",
                format!("unsupported scheme `{}`; expected http or https", url.scheme()),
            ));
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if self.poll_max_attempts == 0 {
            return Err(ApiError::config(
                "poll_max_attempts",
                "0. Expected at least 1",
            ));
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: u64) -> Result<(), ApiError> {
    if !(1..=3600).contains(&value) {
        return Err(ApiError::config(
            field,
            format!("{value}. Expected range: 1..=3600"),
        ));
    }
    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ApiError>
where
    T::Err: std::fmt::Display,
{
    env_value(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ApiError::config(name, format!("`{raw}`: {e}")))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.poll_max_attempts, 100);
        assert!(!config.watch_conversions);
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = ClientConfig::with_base_url("not a url");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"), "got: {err}");

        let config = ClientConfig::with_base_url("ftp://api.example.com/api");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_out_of_range_timeouts() {
        let config = ClientConfig {
            connect_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            read_timeout_secs: 3601,
            ..ClientConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("read_timeout_secs"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_zero_poll_budget() {
        let config = ClientConfig {
            poll_max_attempts: 0,
            ..ClientConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_max_attempts"), "got: {err}");
    }
}
