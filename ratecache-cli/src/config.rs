//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use ratecache_client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use ratecache_hex::DEFAULT_MAX_LOOKBACK;
use ratecache_types::SystemClock;

const DEFAULT_DATABASE_URL: &str = "sqlite://rates.db?mode=rwc";
const DEFAULT_UTC_OFFSET_HOURS: i32 = 3;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub source_url: String,
    pub max_lookback: u32,
    pub request_timeout: Duration,
    pub utc_offset_hours: i32,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("RATES_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let source_url = lookup("RATES_SOURCE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let max_lookback = match lookup("RATES_MAX_LOOKBACK") {
            Some(v) => v.parse()?,
            None => DEFAULT_MAX_LOOKBACK,
        };
        if max_lookback == 0 {
            anyhow::bail!("RATES_MAX_LOOKBACK must be at least 1");
        }

        let request_timeout = match lookup("RATES_REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(v.parse()?),
            None => DEFAULT_TIMEOUT,
        };

        let utc_offset_hours = match lookup("RATES_UTC_OFFSET_HOURS") {
            Some(v) => v.parse()?,
            None => DEFAULT_UTC_OFFSET_HOURS,
        };
        if SystemClock::from_offset_hours(utc_offset_hours).is_none() {
            anyhow::bail!("RATES_UTC_OFFSET_HOURS out of range: {}", utc_offset_hours);
        }

        let log_format = match lookup("RATES_LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!("Unknown RATES_LOG_FORMAT: {}", other),
        };

        Ok(Self {
            database_url,
            source_url,
            max_lookback,
            request_timeout,
            utc_offset_hours,
            log_format,
        })
    }

    /// Clock for "today" in the configured offset.
    pub fn clock(&self) -> SystemClock {
        SystemClock::from_offset_hours(self.utc_offset_hours).unwrap_or_default()
    }
}
