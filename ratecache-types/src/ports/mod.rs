//! Port traits (interfaces for adapters).
//!
//! The resolver depends on these traits, not on the HTTP client or the
//! SQLite store.

mod source;
mod store;

pub use source::RateSource;
pub use store::RateStore;
