//! Backward date scan over the remote source.

use chrono::{Days, NaiveDate};
use tracing::{debug, info, instrument};

use ratecache_types::{CancellationToken, Canceled, RateSnapshot, RateSource};

/// Default lookback window: long enough to bridge multi-day holiday runs.
pub const DEFAULT_MAX_LOOKBACK: u32 = 10;

/// A snapshot found by the scan and the date it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub snapshot: RateSnapshot,
    /// The candidate date that was asked for, never the date the payload
    /// itself reports.
    pub actual_date: NaiveDate,
}

/// Tries the requested date, then up to `max_lookback - 1` preceding days,
/// and returns the first snapshot the source has.
pub struct FallbackSearch<S: RateSource> {
    source: S,
    max_lookback: u32,
}

impl<S: RateSource> FallbackSearch<S> {
    pub fn new(source: S, max_lookback: u32) -> Self {
        Self {
            source,
            max_lookback,
        }
    }

    pub fn with_default_lookback(source: S) -> Self {
        Self::new(source, DEFAULT_MAX_LOOKBACK)
    }

    pub fn max_lookback(&self) -> u32 {
        self.max_lookback
    }

    /// Returns a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scans `requested`, `requested - 1`, ... for at most `max_lookback`
    /// dates. `Ok(None)` means nothing was found in the window.
    ///
    /// Cancellation is checked before every attempt.
    #[instrument(skip(self, cancel), fields(max_lookback = self.max_lookback))]
    pub async fn search(
        &self,
        requested: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Option<Found>, Canceled> {
        for offset in 0..self.max_lookback {
            if cancel.is_cancelled() {
                debug!(offset, "Search canceled");
                return Err(Canceled);
            }

            let Some(candidate) = requested.checked_sub_days(Days::new(u64::from(offset))) else {
                break;
            };

            debug!(%candidate, offset, "Trying date");
            if let Some(snapshot) = self.source.fetch_exact(candidate, cancel).await? {
                if offset > 0 {
                    info!(%candidate, offset, "Using rates from an earlier date");
                }
                return Ok(Some(Found {
                    snapshot,
                    actual_date: candidate,
                }));
            }
        }

        info!("No rates within lookback window");
        Ok(None)
    }
}
