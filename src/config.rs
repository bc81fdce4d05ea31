//! Gateway configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ErrorCode;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TOKEN_FILE: &str = ".burgermafia-token.json";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base URL '{0}' (expected http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("token file path must not be empty")]
    EmptyTokenFile,
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl(_) => "E_INVALID_BASE_URL",
            Self::EmptyTokenFile => "E_EMPTY_TOKEN_FILE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Remote API root, without trailing slash.
    pub api_base_url: String,
    /// Where the CLI persists the session token between runs.
    pub token_file: PathBuf,
    pub connect_timeout_secs: u64,
}

impl GatewayConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `BURGERMAFIA_API_BASE_URL`: default `http://127.0.0.1:8000/api`
    /// - `BURGERMAFIA_TOKEN_FILE`: default `.burgermafia-token.json`
    /// - `BURGERMAFIA_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or the token path is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or the token path is empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup("BURGERMAFIA_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let token_file = lookup("BURGERMAFIA_TOKEN_FILE").unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_owned());
        let connect_timeout_secs = lookup("BURGERMAFIA_CONNECT_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        Self { api_base_url, token_file: PathBuf::from(token_file), connect_timeout_secs }.validated()
    }

    /// Normalize and check an assembled config.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or the token path is empty.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/').to_owned();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.api_base_url));
        }
        if self.token_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyTokenFile);
        }
        self.api_base_url = trimmed;
        Ok(self)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
