//! Snapshots: what the source returns and what the store persists.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rate::RateRecord;

/// One source response: every currency rate published for one exact date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// The date the source claims for this snapshot. Informational only: the
    /// actual date of a result is always the date that was asked for.
    pub reported_date: Option<NaiveDate>,
    pub records: Vec<RateRecord>,
}

impl RateSnapshot {
    pub fn new(records: Vec<RateRecord>) -> Self {
        Self {
            reported_date: None,
            records,
        }
    }

    pub fn with_reported_date(mut self, date: NaiveDate) -> Self {
        self.reported_date = Some(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Builds one persisted row per currency, all sharing the same
    /// requested and actual dates.
    pub fn to_rows(
        &self,
        requested_date: NaiveDate,
        actual_date: NaiveDate,
    ) -> Vec<CachedSnapshot> {
        self.records
            .iter()
            .map(|record| CachedSnapshot::from_record(requested_date, actual_date, record))
            .collect()
    }
}

/// Persisted row: one currency of one cached result.
///
/// `actual_date <= requested_date` always holds, the fallback search never
/// looks forward. Rows are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSnapshot {
    pub requested_date: NaiveDate,
    pub actual_date: NaiveDate,
    pub currency_code: String,
    pub nominal: u32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
}

impl CachedSnapshot {
    pub fn from_record(
        requested_date: NaiveDate,
        actual_date: NaiveDate,
        record: &RateRecord,
    ) -> Self {
        Self {
            requested_date,
            actual_date,
            currency_code: record.currency_code.clone(),
            nominal: record.nominal,
            name: record.name.clone(),
            value: record.value,
        }
    }

    pub fn to_record(&self) -> RateRecord {
        RateRecord {
            currency_code: self.currency_code.clone(),
            nominal: self.nominal,
            name: self.name.clone(),
            value: self.value,
        }
    }
}
