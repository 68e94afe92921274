//! Persistent rate store port.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::domain::CachedSnapshot;
use crate::error::StoreError;

/// Durable store of resolved rates, keyed by requested date.
///
/// Every operation observes `cancel` before and between I/O steps and
/// reports it as `StoreError::Canceled`.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Creates the schema if absent. Idempotent; concurrent first calls run
    /// the setup exactly once and all return after it completed.
    async fn initialize(&self, cancel: &CancellationToken) -> Result<(), StoreError>;

    /// Returns true if any rows exist for the requested date.
    async fn has_data_for(
        &self,
        requested_date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError>;

    /// Returns the most recently written batch of rows for the requested
    /// date, in insertion order. Empty means cache miss.
    async fn read_by_requested_date(
        &self,
        requested_date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<CachedSnapshot>, StoreError>;

    /// Appends rows as one batch. Never merges with or replaces earlier
    /// batches.
    async fn write_all(
        &self,
        rows: &[CachedSnapshot],
        cancel: &CancellationToken,
    ) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<T: RateStore + ?Sized> RateStore for Arc<T> {
    async fn initialize(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        (**self).initialize(cancel).await
    }

    async fn has_data_for(
        &self,
        requested_date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError> {
        (**self).has_data_for(requested_date, cancel).await
    }

    async fn read_by_requested_date(
        &self,
        requested_date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<CachedSnapshot>, StoreError> {
        (**self).read_by_requested_date(requested_date, cancel).await
    }

    async fn write_all(
        &self,
        rows: &[CachedSnapshot],
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        (**self).write_all(rows, cancel).await
    }
}
