//! # Ratecache Hex
//!
//! Application layer of the exchange-rate cache.
//!
//! ## Architecture
//!
//! - `fallback` - backward date scan over a `RateSource`
//! - `service` - the cache-aside resolver over a `RateStore`
//!
//! Both are generic over the port traits, allowing different adapters to
//! be injected.

pub mod fallback;
pub mod service;


pub use fallback::{DEFAULT_MAX_LOOKBACK, FallbackSearch, Found};
pub use service::RateResolver;
