//! Studio configuration parsed from environment variables.

use std::time::Duration;

use canvas::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_AUTOSAVE_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base URL must not be empty")]
    EmptyBaseUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    /// Remote store root, without a trailing slash.
    pub base_url: String,
    /// Autosave quiescence window.
    pub autosave_ms: u64,
    pub timeouts: HttpTimeouts,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            autosave_ms: DEFAULT_AUTOSAVE_MS,
            timeouts: HttpTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl StudioConfig {
    /// Build config from environment variables.
    ///
    /// - `ANNOSTUDIO_BASE_URL`: default `http://localhost:8000`
    /// - `ANNOSTUDIO_AUTOSAVE_MS`: default 1000
    /// - `ANNOSTUDIO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `ANNOSTUDIO_CONNECT_TIMEOUT_SECS`: default 10
    /// - `ANNOSTUDIO_VIEWPORT_WIDTH` / `ANNOSTUDIO_VIEWPORT_HEIGHT`: default 800 / 600
    ///
    /// Unparseable numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] if the base URL is set but blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("ANNOSTUDIO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            autosave_ms: env_parse("ANNOSTUDIO_AUTOSAVE_MS", DEFAULT_AUTOSAVE_MS),
            timeouts: HttpTimeouts {
                request_secs: env_parse("ANNOSTUDIO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("ANNOSTUDIO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            },
            viewport_width: env_parse("ANNOSTUDIO_VIEWPORT_WIDTH", DEFAULT_VIEWPORT_WIDTH),
            viewport_height: env_parse("ANNOSTUDIO_VIEWPORT_HEIGHT", DEFAULT_VIEWPORT_HEIGHT),
        })
    }

    /// Apply command-line overrides on top of the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] for a blank override.
    pub fn with_overrides(mut self, base_url: Option<&str>, autosave_ms: Option<u64>) -> Result<Self, ConfigError> {
        if let Some(url) = base_url {
            self.base_url = normalize_base_url(url)?;
        }
        if let Some(ms) = autosave_ms {
            self.autosave_ms = ms;
        }
        Ok(self)
    }

    #[must_use]
    pub fn autosave_window(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
