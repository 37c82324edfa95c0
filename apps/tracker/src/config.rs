use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::notify::email::EmailCredentials;
use crate::notify::sms::DEFAULT_SMS_API_URL;
use crate::tracking::provider::{DEFAULT_API_HOST, DEFAULT_API_URL};
use crate::tracking::transition::RearmPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(String),

    #[error("Environment variable '{key}' has invalid value '{value}': {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,

    pub flight_api_url: String,
    pub flight_api_key: String,
    pub flight_api_host: String,
    pub flight_api_timeout_secs: u64,

    pub poll_interval_secs: u64,
    pub inter_call_delay_ms: u64,
    pub lookback_hours: i64,
    pub retention_months: u32,
    pub sweep_interval_hours: u64,
    pub rearm: RearmPolicy,

    pub notification_settings_path: PathBuf,
    /// Replaces the built-in status keyword table when set.
    pub status_keywords_path: Option<PathBuf>,

    pub email: Option<EmailCredentials>,
    pub sms_api_url: String,
    pub sms_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let rearm = match optional_env("NOTIFICATION_REARM") {
            None => RearmPolicy::default(),
            Some(value) => RearmPolicy::parse(&value).ok_or_else(|| ConfigError::Invalid {
                key: "NOTIFICATION_REARM".to_string(),
                value,
                reason: "expected 'never' or 'on_recovery'".to_string(),
            })?,
        };

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),

            flight_api_url: optional_env("FLIGHT_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            flight_api_key: optional_env("FLIGHT_API_KEY").unwrap_or_default(),
            flight_api_host: optional_env("FLIGHT_API_HOST")
                .unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
            flight_api_timeout_secs: env_or("FLIGHT_API_TIMEOUT_SECS", 15)?,

            poll_interval_secs: env_or("POLL_INTERVAL_SECS", 60)?,
            inter_call_delay_ms: env_or("INTER_CALL_DELAY_MS", 500)?,
            lookback_hours: env_or("LOOKBACK_HOURS", 24)?,
            retention_months: env_or("RETENTION_MONTHS", 3)?,
            sweep_interval_hours: env_or("SWEEP_INTERVAL_HOURS", 24)?,
            rearm,

            notification_settings_path: optional_env("NOTIFICATION_SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/notification-settings.json")),
            status_keywords_path: optional_env("STATUS_KEYWORDS_PATH").map(PathBuf::from),

            email: email_credentials(),
            sms_api_url: optional_env("SMS_API_URL")
                .unwrap_or_else(|| DEFAULT_SMS_API_URL.to_string()),
            sms_api_key: optional_env("SMS_API_KEY"),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(invalid("POLL_INTERVAL_SECS", "0", "must be at least 1"));
        }
        if self.sweep_interval_hours == 0 {
            return Err(invalid("SWEEP_INTERVAL_HOURS", "0", "must be at least 1"));
        }
        if self.lookback_hours < 0 {
            return Err(invalid(
                "LOOKBACK_HOURS",
                &self.lookback_hours.to_string(),
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// Mail relay credentials, present only when all three variables are set.
fn email_credentials() -> Option<EmailCredentials> {
    Some(EmailCredentials {
        api_url: optional_env("EMAIL_API_URL")?,
        api_key: optional_env("EMAIL_API_KEY")?,
        from: optional_env("EMAIL_FROM")?,
    })
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| ConfigError::Missing(key.to_string()).to_string())
}

/// Unset and blank are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
            value,
        }),
    }
}
