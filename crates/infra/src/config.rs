//! Configuration loading and representation.
//!
//! Everything comes from the process environment; unset variables fall back
//! to development defaults.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_INSTALLMENT_SERVICE_URL: &str = "http://localhost:8081/installments";
pub const DEFAULT_INSTALLMENT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be set when USE_PERSISTENT_STORES=true")]
    Missing { name: &'static str },

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Installment calculator client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorConfig {
    pub url: String,
    pub timeout: Duration,
    /// Extra attempts after a transport failure. Zero keeps the single-call behavior.
    pub retry_attempts: u32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_INSTALLMENT_SERVICE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_INSTALLMENT_TIMEOUT_SECS),
            retry_attempts: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// `None` selects the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub calculator: CalculatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database: None,
            calculator: CalculatorConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let use_persistent = parse_or(&lookup, "USE_PERSISTENT_STORES", false)?;
        let database = if use_persistent {
            let url = lookup("DATABASE_URL").ok_or(ConfigError::Missing {
                name: "DATABASE_URL",
            })?;
            Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                )?,
            })
        } else {
            None
        };

        let calculator = CalculatorConfig {
            url: lookup("INSTALLMENT_SERVICE_URL")
                .unwrap_or_else(|| DEFAULT_INSTALLMENT_SERVICE_URL.to_string()),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "INSTALLMENT_TIMEOUT_SECS",
                DEFAULT_INSTALLMENT_TIMEOUT_SECS,
            )?),
            retry_attempts: parse_or(&lookup, "INSTALLMENT_RETRY_ATTEMPTS", 0)?,
        };

        Ok(Self {
            bind_addr,
            database,
            calculator,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_in_memory_store() {
        let cfg = AppConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn persistent_store_requires_database_url() {
        let err = AppConfig::from_lookup(env(&[("USE_PERSISTENT_STORES", "true")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing { name: "DATABASE_URL" });
    }

    #[test]
    fn reads_all_overrides() {
        let cfg = AppConfig::from_lookup(env(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/loans"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("INSTALLMENT_SERVICE_URL", "http://calc:8081/installments"),
            ("INSTALLMENT_TIMEOUT_SECS", "3"),
            ("INSTALLMENT_RETRY_ATTEMPTS", "2"),
        ]))
        .unwrap();

        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(
            cfg.database,
            Some(DatabaseConfig {
                url: "postgres://localhost/loans".to_string(),
                max_connections: 12,
            })
        );
        assert_eq!(cfg.calculator.url, "http://calc:8081/installments");
        assert_eq!(cfg.calculator.timeout, Duration::from_secs(3));
        assert_eq!(cfg.calculator.retry_attempts, 2);
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = AppConfig::from_lookup(env(&[("INSTALLMENT_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "INSTALLMENT_TIMEOUT_SECS",
                value: "soon".to_string(),
            }
        );
    }
}
