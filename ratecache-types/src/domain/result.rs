//! The value handed to callers of the resolver.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::rate::RateRecord;

/// Rates for a requested date, together with the date they were actually
/// published for.
///
/// An empty `records` list with `actual_date == requested_date` means no
/// snapshot was found within the lookback window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesResult {
    pub requested_date: NaiveDate,
    pub actual_date: NaiveDate,
    pub records: Vec<RateRecord>,
}

impl RatesResult {
    pub fn new(
        requested_date: NaiveDate,
        actual_date: NaiveDate,
        records: Vec<RateRecord>,
    ) -> Self {
        Self {
            requested_date,
            actual_date,
            records,
        }
    }

    /// Result for a date nothing could be found for.
    pub fn no_data(requested_date: NaiveDate) -> Self {
        Self::new(requested_date, requested_date, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if the rates come from an earlier date than requested.
    pub fn is_fallback(&self) -> bool {
        self.actual_date != self.requested_date
    }

    /// Looks up a currency by code, ignoring case.
    pub fn find(&self, code: &str) -> Option<&RateRecord> {
        self.records.iter().find(|r| r.is_currency(code))
    }

    /// Prepends the base currency unless the list already carries it or is
    /// empty.
    pub fn with_base(mut self) -> Self {
        if !self.records.is_empty() && self.find(super::rate::BASE_CURRENCY).is_none() {
            self.records.insert(0, RateRecord::base());
        }
        self
    }
}
