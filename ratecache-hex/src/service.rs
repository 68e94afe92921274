//! Rate Resolver Service
//!
//! Cache-aside orchestration: serve a requested date from the store, or
//! scan the remote source backwards and remember what was found.
//! Contains NO infrastructure logic - only the store and source ports.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use ratecache_types::{
    CachedSnapshot, CancellationToken, Clock, RateSource, RateStore, RatesResult, ResolveError,
};

use crate::fallback::{DEFAULT_MAX_LOOKBACK, FallbackSearch, Found};

type DateLocks = DashMap<NaiveDate, Arc<Mutex<()>>>;

/// Resolves rate snapshots for requested dates.
///
/// Generic over `S: RateSource` and `St: RateStore` - the adapters are
/// injected at compile time, tests use in-memory fakes.
///
/// Cache misses for the same requested date are serialized: the second
/// caller waits for the first and then reads what it stored. Misses for
/// different dates run independently.
pub struct RateResolver<S: RateSource, St: RateStore> {
    search: FallbackSearch<S>,
    store: St,
    in_flight: DateLocks,
}

impl<S: RateSource, St: RateStore> RateResolver<S, St> {
    /// Creates a resolver with the default lookback window.
    pub fn new(source: S, store: St) -> Self {
        Self::with_lookback(source, store, DEFAULT_MAX_LOOKBACK)
    }

    /// Creates a resolver that scans at most `max_lookback` dates per miss.
    pub fn with_lookback(source: S, store: St, max_lookback: u32) -> Self {
        Self {
            search: FallbackSearch::new(source, max_lookback),
            store,
            in_flight: DashMap::new(),
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &St {
        &self.store
    }

    /// Returns a reference to the underlying source.
    pub fn source(&self) -> &S {
        self.search.source()
    }

    pub fn max_lookback(&self) -> u32 {
        self.search.max_lookback()
    }

    /// Number of requested dates with a miss currently being resolved.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Resolves the rates for `requested`.
    ///
    /// - cached: returned as stored, no remote call
    /// - found at or before `requested`: stored, then returned with the
    ///   date it was found for
    /// - nothing in the lookback window: an empty result, not stored
    ///
    /// Store failures and cancellation are the only errors.
    #[instrument(skip(self, cancel))]
    pub async fn resolve(
        &self,
        requested: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<RatesResult, ResolveError> {
        self.store.initialize(cancel).await?;

        if let Some(hit) = self.read_cached(requested, cancel).await? {
            return Ok(hit);
        }

        let date_lock = DateLock::acquire(&self.in_flight, requested);
        let _guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ResolveError::Canceled),
            guard = date_lock.lock.lock() => guard,
        };

        // A concurrent resolve for the same date may have filled the cache
        // while we waited.
        if let Some(hit) = self.read_cached(requested, cancel).await? {
            return Ok(hit);
        }

        self.fetch_and_store(requested, cancel).await
    }

    /// Resolves the rates for the clock's current date.
    pub async fn resolve_today(
        &self,
        clock: &dyn Clock,
        cancel: &CancellationToken,
    ) -> Result<RatesResult, ResolveError> {
        self.resolve(clock.today(), cancel).await
    }

    async fn read_cached(
        &self,
        requested: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Option<RatesResult>, ResolveError> {
        if !self.store.has_data_for(requested, cancel).await? {
            return Ok(None);
        }

        let rows = self.store.read_by_requested_date(requested, cancel).await?;
        // All rows of one batch share the actual date.
        let Some(actual_date) = rows.first().map(|r| r.actual_date) else {
            return Ok(None);
        };

        debug!(%actual_date, currencies = rows.len(), "Cache hit");
        let records = rows.iter().map(CachedSnapshot::to_record).collect();
        Ok(Some(RatesResult::new(requested, actual_date, records)))
    }

    async fn fetch_and_store(
        &self,
        requested: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<RatesResult, ResolveError> {
        let Some(Found {
            snapshot,
            actual_date,
        }) = self.search.search(requested, cancel).await?
        else {
            // Not stored: the source may publish this date later.
            info!("No rates found, returning empty result");
            return Ok(RatesResult::no_data(requested));
        };

        let rows = snapshot.to_rows(requested, actual_date);
        self.store.write_all(&rows, cancel).await?;

        info!(%actual_date, currencies = rows.len(), "Stored fetched rates");
        Ok(RatesResult::new(requested, actual_date, snapshot.records))
    }
}

/// Per-date lock handle. The map entry is removed on drop once no other
/// resolve holds the same lock.
struct DateLock<'a> {
    locks: &'a DateLocks,
    date: NaiveDate,
    lock: Arc<Mutex<()>>,
}

impl<'a> DateLock<'a> {
    fn acquire(locks: &'a DateLocks, date: NaiveDate) -> Self {
        let lock = locks.entry(date).or_default().clone();
        Self { locks, date, lock }
    }
}

impl Drop for DateLock<'_> {
    fn drop(&mut self) {
        // One reference is ours, one is the map's.
        self.locks.remove_if(&self.date, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) <= 2
        });
    }
}
