use std::time::Duration;

use drishya_core::ReconnectPolicy;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

const API_URL_VAR: &str = "DRISHYA_API_URL";
const WS_URL_VAR: &str = "DRISHYA_WS_URL";
const TIMEOUT_VAR: &str = "DRISHYA_REQUEST_TIMEOUT_SECS";
const RECONNECT_BASE_VAR: &str = "DRISHYA_RECONNECT_BASE_MS";
const RECONNECT_ATTEMPTS_VAR: &str = "DRISHYA_RECONNECT_MAX_ATTEMPTS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid url: {message}")]
    InvalidUrl { var: &'static str, message: String },
    #[error("{var} must use one of {expected}, got {scheme}")]
    UnsupportedScheme {
        var: &'static str,
        expected: &'static str,
        scheme: String,
    },
    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Endpoints and timing for the REST client and the live channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub api_url: String,
    pub ws_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset or
    /// blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(API_URL_VAR) {
            config.api_url = value;
        }
        if let Some(value) = get(WS_URL_VAR) {
            config.ws_url = value;
        }
        if let Some(value) = get(TIMEOUT_VAR) {
            config.request_timeout = Duration::from_secs(parse_number(TIMEOUT_VAR, &value)?);
        }
        if let Some(value) = get(RECONNECT_BASE_VAR) {
            config.reconnect.base_delay =
                Duration::from_millis(parse_number(RECONNECT_BASE_VAR, &value)?);
        }
        if let Some(value) = get(RECONNECT_ATTEMPTS_VAR) {
            config.reconnect.max_attempts = parse_number(RECONNECT_ATTEMPTS_VAR, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = ws_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url(API_URL_VAR, &self.api_url, &["http", "https"], "http, https")?;
        check_url(WS_URL_VAR, &self.ws_url, &["ws", "wss"], "ws, wss")?;
        Ok(())
    }
}

fn check_url(
    var: &'static str,
    raw: &str,
    schemes: &[&str],
    expected: &'static str,
) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw).map_err(|err| ConfigError::InvalidUrl {
        var,
        message: err.to_string(),
    })?;
    if !schemes.contains(&parsed.scheme()) {
        return Err(ConfigError::UnsupportedScheme {
            var,
            expected,
            scheme: parsed.scheme().to_string(),
        });
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}
