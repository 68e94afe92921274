//! Database row types and their conversion to domain types.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use ratecache_types::{CachedSnapshot, StoreError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifier shared by all rows of one `write_all` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId(Uuid);

impl BatchId {
    /// Creates a new random BatchId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rate row from database.
#[derive(FromRow)]
pub struct DbRate {
    pub requested_date: String,
    pub actual_date: String,
    pub currency_code: String,
    pub nominal: i64,
    pub name: String,
    pub value: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("bad date {:?}: {}", s, e)))
}

pub fn parse_value(s: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(s).map_err(|e| StoreError::Corrupt(format!("bad value {:?}: {}", s, e)))
}

impl DbRate {
    /// Convert database row to domain CachedSnapshot.
    pub fn into_domain(self) -> Result<CachedSnapshot, StoreError> {
        let nominal = u32::try_from(self.nominal)
            .map_err(|_| StoreError::Corrupt(format!("bad nominal {}", self.nominal)))?;

        Ok(CachedSnapshot {
            requested_date: parse_date(&self.requested_date)?,
            actual_date: parse_date(&self.actual_date)?,
            currency_code: self.currency_code,
            nominal,
            name: self.name,
            value: parse_value(&self.value)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(nominal: i64, value: &str) -> DbRate {
        DbRate {
            requested_date: "2024-01-06".into(),
            actual_date: "2024-01-05".into(),
            currency_code: "USD".into(),
            nominal,
            name: "US Dollar".into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_row_into_domain() {
        let snapshot = row(1, "91.5000").into_domain().unwrap();
        assert_eq!(snapshot.actual_date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(snapshot.value.to_string(), "91.5000");
    }

    #[test]
    fn test_negative_nominal_is_corrupt() {
        assert!(matches!(row(-1, "1").into_domain(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_bad_value_is_corrupt() {
        assert!(matches!(
            row(1, "ninety").into_domain(),
            Err(StoreError::Corrupt(_))
        ));
    }
}
