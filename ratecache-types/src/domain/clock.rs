//! Source of "today", injected rather than read from ambient state.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::error::DomainError;

/// Supplies the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock observed at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock at a whole-hour offset from UTC. Returns `None` when the offset
    /// is out of range.
    pub fn from_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours * 3600).map(Self::new)
    }

    /// Moscow time (UTC+3), the locale the rate source publishes in.
    pub fn moscow() -> Self {
        Self::new(FixedOffset::east_opt(3 * 3600).unwrap_or_else(|| Utc.fix()))
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::moscow()
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Clock frozen on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Rejects dates after today: the latest date a caller may select is the
/// clock's current date.
pub fn ensure_selectable(date: NaiveDate, clock: &dyn Clock) -> Result<NaiveDate, DomainError> {
    let today = clock.today();
    if date > today {
        return Err(DomainError::FutureDate {
            requested: date,
            today,
        });
    }
    Ok(date)
}
