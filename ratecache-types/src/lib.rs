//! # Ratecache Types
//!
//! Domain types and port traits for the exchange-rate cache.
//! This crate has no IO of its own - only data structures, the error
//! taxonomy and trait definitions.
//!
//! ## Architecture
//!
//! - `domain/` - rate records, snapshots, resolve results, the clock
//! - `ports/` - traits the remote source and the store adapters implement
//! - `error/` - cancellation, store and resolve errors

pub mod domain;
pub mod error;
pub mod ports;

pub use domain::{
    BASE_CURRENCY, CachedSnapshot, Clock, FixedClock, RateRecord, RateSnapshot, RatesResult,
    SystemClock, convert, ensure_selectable,
};
pub use error::{Canceled, DomainError, ResolveError, StoreError};
pub use ports::{RateSource, RateStore};

/// Re-exported so adapters and callers agree on one cancellation type.
pub use tokio_util::sync::CancellationToken;
