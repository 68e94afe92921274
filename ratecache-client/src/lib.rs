//! # Ratecache Client
//!
//! HTTP adapter for the daily exchange-rate archive. Implements the
//! `RateSource` port: one request per exact date, no caching, no fallback.

mod dto;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use ratecache_types::{CancellationToken, Canceled, RateSnapshot, RateSource};

pub use dto::{DailyResponse, ValuteDto};

/// Public mirror of the central bank's daily rates.
pub const DEFAULT_BASE_URL: &str = "https://www.cbr-xml-daily.ru";

/// Overall budget for one exact-date request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for a single archive request.
///
/// Never leaves the crate through `RateSource`: each variant means "no
/// data for this date".
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot contains no currencies")]
    EmptySnapshot,
}

/// Daily archive client.
pub struct CbrClient {
    base_url: String,
    http: Client,
}

impl CbrClient {
    /// Creates a client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ratecache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Archive address of one exact date.
    pub fn archive_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/archive/{:04}/{:02}/{:02}/daily_json.js",
            self.base_url,
            date.year(),
            date.month(),
            date.day()
        )
    }

    /// Downloads and decodes the snapshot for `date`.
    pub async fn fetch(&self, date: NaiveDate) -> Result<RateSnapshot, ClientError> {
        let url = self.archive_url(date);
        debug!(%url, "Requesting archive");

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        let dto: DailyResponse = serde_json::from_str(&body)?;
        let snapshot = dto.into_snapshot();
        if snapshot.is_empty() {
            return Err(ClientError::EmptySnapshot);
        }

        Ok(snapshot)
    }
}

#[async_trait]
impl RateSource for CbrClient {
    #[instrument(skip(self, cancel))]
    async fn fetch_exact(
        &self,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Option<RateSnapshot>, Canceled> {
        if cancel.is_cancelled() {
            return Err(Canceled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Canceled),
            result = self.fetch(date) => match result {
                Ok(snapshot) => {
                    if snapshot.reported_date.is_some_and(|d| d != date) {
                        debug!(
                            reported = ?snapshot.reported_date,
                            "Source reports a different date"
                        );
                    }
                    debug!(currencies = snapshot.records.len(), "Archive hit");
                    Ok(Some(snapshot))
                }
                Err(e) => {
                    warn!(error = %e, "No rates for date");
                    Ok(None)
                }
            },
        }
    }
}
