//! Environment-driven configuration.

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use pocketledger_auth::AuthPolicy;
use pocketledger_auth::service::DEFAULT_OTP_TTL_SECS;
use pocketledger_expenses::ReportOptions;
use pocketledger_expenses::report::{DEFAULT_CURRENCY_SYMBOL, DEFAULT_LARGE_EXPENSE_THRESHOLD};
use pocketledger_observability::{DEFAULT_FILTER, LogConfig};

pub const ENV_DATA_FILE: &str = "POCKETLEDGER_DATA_FILE";
pub const ENV_OTP_TTL_SECS: &str = "POCKETLEDGER_OTP_TTL_SECS";
pub const ENV_LARGE_EXPENSE: &str = "POCKETLEDGER_LARGE_EXPENSE";
pub const ENV_CURRENCY_SYMBOL: &str = "POCKETLEDGER_CURRENCY_SYMBOL";
pub const ENV_LOG: &str = "POCKETLEDGER_LOG";
pub const ENV_LOG_JSON: &str = "POCKETLEDGER_LOG_JSON";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive number of seconds, got {value:?}")]
    InvalidTtl { key: &'static str, value: String },

    #[error("{key} must be a non-negative amount, got {value:?}")]
    InvalidAmount { key: &'static str, value: String },

    #[error("{key} must be true or false, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// JSON file backing the store; `None` keeps everything in memory.
    pub data_file: Option<PathBuf>,
    pub otp_ttl_secs: i64,
    pub large_expense_threshold: f64,
    pub currency_symbol: String,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            otp_ttl_secs: DEFAULT_OTP_TTL_SECS,
            large_expense_threshold: DEFAULT_LARGE_EXPENSE_THRESHOLD,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. Unset and blank values take defaults.
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

        let otp_ttl_secs = match get(ENV_OTP_TTL_SECS) {
            None => defaults.otp_ttl_secs,
            Some(value) => match value.parse::<i64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidTtl {
                        key: ENV_OTP_TTL_SECS,
                        value,
                    });
                }
            },
        };

        let large_expense_threshold = match get(ENV_LARGE_EXPENSE) {
            None => defaults.large_expense_threshold,
            Some(value) => match value.parse::<f64>() {
                Ok(amount) if amount.is_finite() && amount >= 0.0 => amount,
                _ => {
                    return Err(ConfigError::InvalidAmount {
                        key: ENV_LARGE_EXPENSE,
                        value,
                    });
                }
            },
        };

        let json = match get(ENV_LOG_JSON) {
            None => defaults.log.json,
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag {
                key: ENV_LOG_JSON,
                value,
            })?,
        };

        Ok(Self {
            data_file: get(ENV_DATA_FILE).map(PathBuf::from),
            otp_ttl_secs,
            large_expense_threshold,
            currency_symbol: get(ENV_CURRENCY_SYMBOL).unwrap_or(defaults.currency_symbol),
            log: LogConfig {
                filter: get(ENV_LOG).unwrap_or_else(|| DEFAULT_FILTER.to_string()),
                json,
            },
        })
    }

    pub fn auth_policy(&self) -> AuthPolicy {
        AuthPolicy {
            otp_ttl: Duration::seconds(self.otp_ttl_secs),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            large_expense_threshold: self.large_expense_threshold,
            currency_symbol: self.currency_symbol.clone(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.otp_ttl_secs, 600);
        assert_eq!(cfg.large_expense_threshold, 2000.0);
        assert_eq!(cfg.currency_symbol, "₹");
        assert!(cfg.data_file.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            (ENV_DATA_FILE, "/tmp/ledger.json"),
            (ENV_OTP_TTL_SECS, "60"),
            (ENV_LARGE_EXPENSE, "500.5"),
            (ENV_CURRENCY_SYMBOL, "$"),
            (ENV_LOG, "debug"),
            (ENV_LOG_JSON, "true"),
        ])
        .unwrap();

        assert_eq!(cfg.data_file, Some(PathBuf::from("/tmp/ledger.json")));
        assert_eq!(cfg.auth_policy().otp_ttl, Duration::seconds(60));
        assert_eq!(cfg.report_options().large_expense_threshold, 500.5);
        assert_eq!(cfg.report_options().currency_symbol, "$");
        assert_eq!(
            cfg.log,
            LogConfig {
                filter: "debug".to_string(),
                json: true
            }
        );
    }

    #[test]
    fn blank_values_fall_back() {
        let cfg = config(&[(ENV_DATA_FILE, "  "), (ENV_OTP_TTL_SECS, "")]).unwrap();
        assert!(cfg.data_file.is_none());
        assert_eq!(cfg.otp_ttl_secs, DEFAULT_OTP_TTL_SECS);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches!(
            config(&[(ENV_OTP_TTL_SECS, "ten")]),
            Err(ConfigError::InvalidTtl { .. })
        ));
        assert!(matches!(
            config(&[(ENV_OTP_TTL_SECS, "0")]),
            Err(ConfigError::InvalidTtl { .. })
        ));
        assert!(matches!(
            config(&[(ENV_LARGE_EXPENSE, "-1")]),
            Err(ConfigError::InvalidAmount { .. })
        ));
        assert!(matches!(
            config(&[(ENV_LARGE_EXPENSE, "NaN")]),
            Err(ConfigError::InvalidAmount { .. })
        ));
        assert!(matches!(
            config(&[(ENV_LOG_JSON, "maybe")]),
            Err(ConfigError::InvalidFlag { .. })
        ));
    }
}
