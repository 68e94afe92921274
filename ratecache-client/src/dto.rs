//! Wire format of the daily archive document.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

use ratecache_types::{RateRecord, RateSnapshot};

/// Top-level archive document.
#[derive(Debug, Deserialize)]
pub struct DailyResponse {
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    /// Keyed by the source's internal currency id (e.g. `R01235`)
    #[serde(rename = "Valute", default)]
    pub valute: BTreeMap<String, ValuteDto>,
}

/// One currency entry of the archive document.
#[derive(Debug, Deserialize)]
pub struct ValuteDto {
    #[serde(rename = "CharCode")]
    pub char_code: String,
    #[serde(rename = "Nominal")]
    pub nominal: u32,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Value", with = "rust_decimal::serde::arbitrary_precision")]
    pub value: Decimal,
}

impl DailyResponse {
    /// Date the document claims to be for, if it parses.
    pub fn reported_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.date_naive())
    }

    pub fn into_snapshot(self) -> RateSnapshot {
        let reported_date = self.reported_date();
        let records = self
            .valute
            .into_values()
            .map(|v| RateRecord::new(v.char_code, v.nominal, v.name, v.value))
            .collect();

        RateSnapshot {
            reported_date,
            records,
        }
    }
}
