//! SQLite store adapter.
#![allow(clippy::collapsible_if)]

use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use ratecache_types::{CachedSnapshot, CancellationToken, Canceled, RateStore, StoreError};

use crate::types::{BatchId, DbRate, format_date};

const SCHEMA: &str = include_str!("../migrations/0001_create_rates.sql");

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Store
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite store implementation.
///
/// The schema is created lazily by the first `initialize` call. The
/// first-time check and set is guarded by `init_lock`; `initialized` only
/// serves the fast path once setup has completed.
pub struct SqliteStore {
    pool: SqlitePool,
    initialized: AtomicBool,
    init_lock: Mutex<()>,
    init_runs: AtomicUsize,
}

impl SqliteStore {
    /// Opens (creating if missing) the database file behind `database_url`.
    ///
    /// The schema is not touched until `initialize`.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool. The schema is created on first use.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            initialized: AtomicBool::new(false),
            init_lock: Mutex::new(()),
            init_runs: AtomicUsize::new(0),
        }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of times the schema setup actually ran on this handle.
    pub fn initialization_count(&self) -> usize {
        self.init_runs.load(Ordering::Acquire)
    }

    async fn ensure_initialized(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        self.initialize(cancel).await
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Runs a read, abandoning it as soon as `cancel` fires.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, sqlx::Error>>,
) -> Result<T, StoreError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Canceled.into()),
        result = fut => result.map_err(db_err),
    }
}

fn check(cancel: &CancellationToken) -> Result<(), StoreError> {
    if cancel.is_cancelled() {
        return Err(Canceled.into());
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for SqliteStore {
    #[instrument(skip_all)]
    async fn initialize(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        let _guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Canceled.into()),
            guard = self.init_lock.lock() => guard,
        };

        // Another caller may have finished setup while we waited.
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        check(cancel)?;

        debug!("Creating rate schema");
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        self.init_runs.fetch_add(1, Ordering::AcqRel);
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    #[instrument(skip(self, cancel))]
    async fn has_data_for(
        &self,
        requested_date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError> {
        self.ensure_initialized(cancel).await?;

        let exists: i64 = cancellable(
            cancel,
            sqlx::query_scalar(
                r#"SELECT EXISTS(SELECT 1 FROM rates WHERE requested_date = ?)"#,
            )
            .bind(format_date(requested_date))
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(exists != 0)
    }

    #[instrument(skip(self, cancel))]
    async fn read_by_requested_date(
        &self,
        requested_date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<CachedSnapshot>, StoreError> {
        self.ensure_initialized(cancel).await?;

        let date = format_date(requested_date);
        let rows: Vec<DbRate> = cancellable(
            cancel,
            sqlx::query_as(
                r#"SELECT requested_date, actual_date, currency_code, nominal, name, value
                   FROM rates
                   WHERE requested_date = ?
                     AND batch_id = (SELECT batch_id FROM rates WHERE requested_date = ? ORDER BY id DESC LIMIT 1)
                   ORDER BY id"#,
            )
            .bind(&date)
            .bind(&date)
            .fetch_all(&self.pool),
        )
        .await?;

        debug!(rows = rows.len(), "Read cached rates");
        rows.into_iter().map(DbRate::into_domain).collect()
    }

    #[instrument(skip_all, fields(rows = rows.len()))]
    async fn write_all(
        &self,
        rows: &[CachedSnapshot],
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        self.ensure_initialized(cancel).await?;
        if rows.is_empty() {
            return Ok(());
        }
        check(cancel)?;

        let batch_id = BatchId::new().to_string();
        let mut db_tx = self.pool.begin().await.map_err(db_err)?;

        for row in rows {
            // Dropping the open transaction rolls the batch back.
            check(cancel)?;

            sqlx::query(
                r#"INSERT INTO rates (batch_id, requested_date, actual_date, currency_code, nominal, name, value)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(&batch_id)
            .bind(format_date(row.requested_date))
            .bind(format_date(row.actual_date))
            .bind(&row.currency_code)
            .bind(i64::from(row.nominal))
            .bind(&row.name)
            .bind(row.value.to_string())
            .execute(&mut *db_tx)
            .await
            .map_err(db_err)?;
        }

        check(cancel)?;
        db_tx.commit().await.map_err(db_err)?;

        debug!(%batch_id, "Stored rate batch");
        Ok(())
    }
}
