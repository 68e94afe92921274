//! Remote rate source port.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::domain::RateSnapshot;
use crate::error::Canceled;

/// Fetches rate snapshots for exact dates. No caching, no fallback.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the snapshot published for exactly `date`.
    ///
    /// Network errors, bad statuses, undecodable payloads, timeouts and empty
    /// snapshots are all reported as `Ok(None)`. Only cancellation through
    /// `cancel` is an error.
    async fn fetch_exact(
        &self,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Option<RateSnapshot>, Canceled>;
}

#[async_trait::async_trait]
impl<T: RateSource + ?Sized> RateSource for Arc<T> {
    async fn fetch_exact(
        &self,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Option<RateSnapshot>, Canceled> {
        (**self).fetch_exact(date, cancel).await
    }
}
