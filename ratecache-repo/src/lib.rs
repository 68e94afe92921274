//! # Ratecache Repository
//!
//! Concrete store implementation (adapter) for the exchange-rate cache.
//! This crate provides the SQLite adapter that implements the `RateStore` port.

pub mod sqlite;
mod types;

#[cfg(test)]
mod sqlite_tests;

pub use sqlite::SqliteStore;

/// Opens a store from a database URL.
///
/// The schema is created on the first store operation (or an explicit
/// `RateStore::initialize`), not here.
///
/// # Examples
///
/// ```ignore
/// let store = build_store("sqlite://rates.db?mode=rwc").await?;
/// ```
pub async fn build_store(database_url: &str) -> anyhow::Result<SqliteStore> {
    SqliteStore::new(database_url).await
}
