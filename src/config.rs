//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Deadline for a single transfer; elapsing before commit rolls it back
    pub transfer_timeout: Duration,

    /// Capacity of the background task queue
    pub task_queue_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let transfer_timeout_ms: u64 = lookup("TRANSFER_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TRANSFER_TIMEOUT_MS"))?;

        let task_queue_capacity: usize = lookup("TASK_QUEUE_CAPACITY")
            .unwrap_or_else(|| "1024".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TASK_QUEUE_CAPACITY"))?;

        // tokio's bounded channel panics on zero capacity
        if task_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue("TASK_QUEUE_CAPACITY"));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            transfer_timeout: Duration::from_millis(transfer_timeout_ms),
            task_queue_capacity,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
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
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/bank")]))
                .unwrap();

        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.transfer_timeout, Duration::from_millis(5000));
        assert_eq!(config.task_queue_capacity, 1024);
        assert!(!config.is_production());
    }

    #[test]
    fn test_missing_database_url() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingEnv("DATABASE_URL"))));
    }

    #[test]
    fn test_invalid_values() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/bank"),
            ("PORT", "not-a-port"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue("PORT"))));

        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/bank"),
            ("TASK_QUEUE_CAPACITY", "0"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue("TASK_QUEUE_CAPACITY"))));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/bank"),
            ("ENVIRONMENT", "production"),
            ("TRANSFER_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.transfer_timeout, Duration::from_millis(250));
    }
}
