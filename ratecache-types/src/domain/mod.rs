//! Domain models for the rate cache.

pub mod clock;
pub mod rate;
pub mod result;
pub mod snapshot;

pub use clock::{Clock, FixedClock, SystemClock, ensure_selectable};
pub use rate::{BASE_CURRENCY, RateRecord, convert};
pub use result::RatesResult;
pub use snapshot::{CachedSnapshot, RateSnapshot};
