//! services/dashboard/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::Url;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub students_api_url: Url,
    pub courses_api_url: Url,
    pub cache_dir: PathBuf,
    pub log_level: Level,
    pub request_timeout: Duration,
    pub allowed_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Server Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = lookup("ALLOWED_ORIGIN")
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        // --- Remote Resources ---
        let students_api_url = required_url(&lookup, "STUDENTS_API_URL")?;
        let courses_api_url = required_url(&lookup, "COURSES_API_URL")?;

        let timeout_str = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "15".to_string());
        let request_timeout = timeout_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        // --- Local Cache ---
        let cache_dir = lookup("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./.cache"));

        Ok(Self {
            bind_address,
            students_api_url,
            courses_api_url,
            cache_dir,
            log_level,
            request_timeout,
            allowed_origin,
        })
    }
}

fn required_url(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Url, ConfigError> {
    let raw = lookup(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()))?;
    Url::parse(&raw).map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_urls_are_set() {
        let config = Config::from_lookup(lookup_from(&[
            ("STUDENTS_API_URL", "https://api.example.com/v1/students"),
            ("COURSES_API_URL", "https://api.example.com/v1/courses"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.cache_dir, PathBuf::from("./.cache"));
        assert_eq!(config.students_api_url.path(), "/v1/students");
    }

    #[test]
    fn missing_students_url_is_reported() {
        let err = Config::from_lookup(lookup_from(&[(
            "COURSES_API_URL",
            "https://api.example.com/v1/courses",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "STUDENTS_API_URL"));
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("STUDENTS_API_URL", "not a url"),
            ("COURSES_API_URL", "https://api.example.com/v1/courses"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "STUDENTS_API_URL"));

        let err = Config::from_lookup(lookup_from(&[
            ("STUDENTS_API_URL", "https://api.example.com/s"),
            ("COURSES_API_URL", "https://api.example.com/c"),
            ("REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "REQUEST_TIMEOUT_SECS"));
    }
}
