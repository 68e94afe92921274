//! A single currency quote with exact decimal value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency every value published by the source is quoted in.
pub const BASE_CURRENCY: &str = "RUB";

/// One currency's rate on one actual date.
///
/// `value` is the price of `nominal` units of the currency, expressed in
/// [`BASE_CURRENCY`]. The scale of `value` is kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateRecord {
    /// Alphabetic currency code, e.g. `USD`
    pub currency_code: String,
    /// Number of units `value` is quoted against
    pub nominal: u32,
    /// Display name, informational only
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
}

impl RateRecord {
    pub fn new(
        currency_code: impl Into<String>,
        nominal: u32,
        name: impl Into<String>,
        value: Decimal,
    ) -> Self {
        Self {
            currency_code: currency_code.into(),
            nominal,
            name: name.into(),
            value,
        }
    }

    /// The base currency itself: one ruble costs one ruble.
    pub fn base() -> Self {
        Self::new(BASE_CURRENCY, 1, "Russian Ruble", Decimal::ONE)
    }

    /// Price of a single unit of the currency.
    ///
    /// A zero nominal never divides: the rate is undefined and reported as
    /// `Decimal::ZERO`.
    pub fn rate_per_unit(&self) -> Decimal {
        if self.nominal == 0 {
            return Decimal::ZERO;
        }
        self.value
            .checked_div(Decimal::from(self.nominal))
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns true if the code matches, ignoring ASCII case.
    pub fn is_currency(&self, code: &str) -> bool {
        self.currency_code.eq_ignore_ascii_case(code)
    }
}

impl fmt::Display for RateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} = {} {} ({})",
            self.nominal, self.currency_code, self.value, BASE_CURRENCY, self.name
        )
    }
}

/// Converts `amount` units of `from` into units of `to` through the base
/// currency, rounded to two decimal places (banker's rounding).
///
/// Returns `None` when the target rate is undefined (zero nominal or zero
/// value) or the arithmetic overflows.
pub fn convert(amount: Decimal, from: &RateRecord, to: &RateRecord) -> Option<Decimal> {
    let target_per_unit = to.rate_per_unit();
    if target_per_unit.is_zero() {
        return None;
    }
    let in_base = amount.checked_mul(from.rate_per_unit())?;
    let converted = in_base.checked_div(target_per_unit)?;
    Some(converted.round_dp(2))
}
