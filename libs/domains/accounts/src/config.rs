use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load and parse environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load and parse environment variable or return error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Tunables for the account workflows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountsConfig {
    /// Lifetime of one-time codes in the code store
    pub code_ttl: Duration,
    /// Digits per generated code
    pub code_length: usize,
    /// Capacity of the notification queue; overflow is dropped
    pub notification_queue: usize,
    pub password_min_length: usize,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::from_secs(900),
            code_length: 6,
            notification_queue: 256,
            password_min_length: 8,
        }
    }
}

impl FromEnv for AccountsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            code_ttl: Duration::from_secs(env_parse(
                "ACCOUNTS_CODE_TTL_SECS",
                defaults.code_ttl.as_secs(),
            )?),
            code_length: env_parse("ACCOUNTS_CODE_LENGTH", defaults.code_length)?,
            notification_queue: env_parse(
                "ACCOUNTS_NOTIFICATION_QUEUE",
                defaults.notification_queue,
            )?,
            password_min_length: env_parse(
                "ACCOUNTS_PASSWORD_MIN_LENGTH",
                defaults.password_min_length,
            )?,
        })
    }
}

/// Redis connection for the code store
#[derive(Clone, Debug)]
pub struct RedisCodeStoreConfig {
    pub uri: String,
}

impl FromEnv for RedisCodeStoreConfig {
    /// Requires REDIS_HOST to be set (no default)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            uri: env_required("REDIS_HOST")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 4] = [
        "ACCOUNTS_CODE_TTL_SECS",
        "ACCOUNTS_CODE_LENGTH",
        "ACCOUNTS_NOTIFICATION_QUEUE",
        "ACCOUNTS_PASSWORD_MIN_LENGTH",
    ];

    #[test]
    fn test_accounts_config_defaults() {
        temp_env::with_vars_unset(KEYS, || {
            let config = AccountsConfig::from_env().unwrap();
            assert_eq!(config, AccountsConfig::default());
            assert_eq!(config.code_ttl, Duration::from_secs(900));
        });
    }

    #[test]
    fn test_accounts_config_overrides() {
        temp_env::with_vars(
            [
                ("ACCOUNTS_CODE_TTL_SECS", Some("60")),
                ("ACCOUNTS_CODE_LENGTH", Some("8")),
                ("ACCOUNTS_NOTIFICATION_QUEUE", Some(" 16 ")),
                ("ACCOUNTS_PASSWORD_MIN_LENGTH", Some("12")),
            ],
            || {
                let config = AccountsConfig::from_env().unwrap();
                assert_eq!(config.code_ttl, Duration::from_secs(60));
                assert_eq!(config.code_length, 8);
                assert_eq!(config.notification_queue, 16);
                assert_eq!(config.password_min_length, 12);
            },
        );
    }

    #[test]
    fn test_accounts_config_parse_error() {
        temp_env::with_var("ACCOUNTS_CODE_TTL_SECS", Some("soon"), || {
            let err = AccountsConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { .. }));
            assert!(err.to_string().contains("ACCOUNTS_CODE_TTL_SECS"));
        });
    }

    #[test]
    fn test_redis_config_from_env_success() {
        temp_env::with_var("REDIS_HOST", Some("redis://localhost:6379"), || {
            let config = RedisCodeStoreConfig::from_env().unwrap();
            assert_eq!(config.uri, "redis://localhost:6379");
        });
    }

    #[test]
    fn test_redis_config_from_env_missing() {
        temp_env::with_var_unset("REDIS_HOST", || {
            let err = RedisCodeStoreConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("REDIS_HOST"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_or_default_without_value() {
        temp_env::with_var_unset("ACCOUNTS_MISSING_VAR", || {
            assert_eq!(env_or_default("ACCOUNTS_MISSING_VAR", "fallback"), "fallback");
        });
    }
}
