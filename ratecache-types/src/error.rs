//! Error types for the rate cache.

use chrono::NaiveDate;

/// The caller abandoned the operation.
///
/// This is the only abrupt outcome of a remote fetch or a fallback search;
/// every other source failure is reported as absent data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Operation canceled")]
pub struct Canceled;

/// Domain-level errors (invalid caller input).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Date {requested} is after today ({today})")]
    FutureDate {
        requested: NaiveDate,
        today: NaiveDate,
    },

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Rate for {0} is undefined")]
    UndefinedRate(String),
}

/// Persistent store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Canceled(#[from] Canceled),
}

/// Outcome of a failed resolve.
///
/// "No data" is not an error: it is an empty `RatesResult`.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Resolve canceled")]
    Canceled,

    #[error("Rate store failure: {0}")]
    Store(StoreError),
}

impl ResolveError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, ResolveError::Canceled)
    }
}

impl From<Canceled> for ResolveError {
    fn from(_: Canceled) -> Self {
        ResolveError::Canceled
    }
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Canceled(_) => ResolveError::Canceled,
            other => ResolveError::Store(other),
        }
    }
}
