//! Configuration for the registration screen.

use crate::validation::ErrorPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Registration configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Registration behaviour
    #[serde(default)]
    pub registration: RegistrationConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Realtime database base URL (empty means in-memory storage)
    #[serde(default)]
    pub url: String,

    /// Database auth token
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Enable persistence (if false, records are kept in memory only)
    #[serde(default = "default_true")]
    pub persist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// How messages for the same field are combined
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Number of username suggestions offered on a collision
    #[serde(default = "default_suggestion_count")]
    pub suggestion_count: usize,

    /// Ignore a submit while another one is still pending
    #[serde(default)]
    pub guard_in_flight: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl DatabaseConfig {
    /// Whether records should go to the remote database.
    pub fn is_remote(&self) -> bool {
        self.persist && !self.url.trim().is_empty()
    }
}

// Default implementations
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            auth_token: None,
            timeout: default_timeout(),
            persist: true,
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::default(),
            suggestion_count: default_suggestion_count(),
            guard_in_flight: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

fn default_suggestion_count() -> usize {
    3
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert!(config.database.url.is_empty());
        assert!(config.database.persist);
        assert_eq!(config.database.timeout, Duration::from_secs(30));
        assert_eq!(config.registration.error_policy, ErrorPolicy::LastWins);
        assert_eq!(config.registration.suggestion_count, 3);
        assert!(!config.registration.guard_in_flight);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_is_remote() {
        let mut database = DatabaseConfig::default();
        assert!(!database.is_remote());

        database.url = "https://family-app.example.com".into();
        assert!(database.is_remote());

        database.persist = false;
        assert!(!database.is_remote());
    }

    #[test]
    fn test_deserialize_from_map() {
        let config: Config = config::Config::builder()
            .set_override("database.url", "https://family-app.example.com")
            .unwrap()
            .set_override("database.timeout", "5s")
            .unwrap()
            .set_override("registration.error_policy", "first_wins")
            .unwrap()
            .set_override("registration.guard_in_flight", true)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database.url, "https://family-app.example.com");
        assert_eq!(config.database.timeout, Duration::from_secs(5));
        assert_eq!(config.registration.error_policy, ErrorPolicy::FirstWins);
        assert!(config.registration.guard_in_flight);
        assert_eq!(config.registration.suggestion_count, 3);
    }
}
