//! Process configuration read from the environment at startup.

use std::time::Duration;

use tracing_subscriber::filter::LevelFilter;

use crate::error::ConfigError;

pub const DEFAULT_STORAGE_SECRET_NAME: &str = "dummy-json-storage01-connection-string";
pub const DEFAULT_CONTAINER_NAME: &str = "raw";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILE: &str = "logs/raw_ingest.log";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Endpoint override for the secret store; `None` uses the ambient one.
    pub secret_store_uri: Option<String>,
    /// Name of the secret holding the storage connection string.
    pub storage_secret_name: String,
    pub container_name: String,
    pub log_level: String,
    /// Base path of the daily-rolling JSON log file.
    pub log_file: String,
    /// JSON file overriding the built-in endpoint registry.
    pub endpoints_file: Option<String>,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_store_uri: None,
            storage_secret_name: DEFAULT_STORAGE_SECRET_NAME.to_string(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
            endpoints_file: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl Config {
    /// Reads configuration from process environment variables (after `.env`
    /// has been loaded by the caller) and validates it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    key: "HTTP_TIMEOUT_SECS",
                    reason: format!("'{raw}' is not a whole number of seconds"),
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.http_timeout,
        };

        let config = Self {
            secret_store_uri: get("SECRET_STORE_URI"),
            storage_secret_name: get("STORAGE_SECRET_NAME").unwrap_or(defaults.storage_secret_name),
            container_name: get("RAW_CONTAINER_NAME").unwrap_or(defaults.container_name),
            log_level: get("LOG_LEVEL")
                .map(|v| v.to_ascii_lowercase())
                .unwrap_or(defaults.log_level),
            log_file: get("LOG_FILE_PATH").unwrap_or(defaults.log_file),
            endpoints_file: get("ENDPOINTS_FILE"),
            http_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(uri) = &self.secret_store_uri {
            reqwest::Url::parse(uri).map_err(|e| ConfigError::Invalid {
                key: "SECRET_STORE_URI",
                reason: e.to_string(),
            })?;
        }

        if self.storage_secret_name.is_empty() {
            return Err(ConfigError::Invalid {
                key: "STORAGE_SECRET_NAME",
                reason: "must not be empty".to_string(),
            });
        }

        let container_ok = (3..=63).contains(&self.container_name.len())
            && self
                .container_name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
        if !container_ok {
            return Err(ConfigError::Invalid {
                key: "RAW_CONTAINER_NAME",
                reason: format!(
                    "'{}' must be 3-63 lowercase letters, digits, '-' or '.'",
                    self.container_name
                ),
            });
        }

        self.log_level
            .parse::<LevelFilter>()
            .map_err(|e| ConfigError::Invalid {
                key: "LOG_LEVEL",
                reason: e.to_string(),
            })?;

        if std::path::Path::new(&self.log_file).file_name().is_none() {
            return Err(ConfigError::Invalid {
                key: "LOG_FILE_PATH",
                reason: format!("'{}' does not name a file", self.log_file),
            });
        }

        if self.http_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "HTTP_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
