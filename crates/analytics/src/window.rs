//! Trailing analytics window, anchored at a caller-supplied "now".

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use stocklens_core::{DomainError, DomainResult};

/// Trailing window of whole calendar days ending today (inclusive).
///
/// The length is both the retrieval range and the denominator for rate and
/// frequency calculations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Window(u32);

impl Window {
    pub fn new(days: u32) -> DomainResult<Self> {
        if days == 0 {
            return Err(DomainError::validation("window must be at least 1 day"));
        }
        Ok(Self(days))
    }

    pub fn days(&self) -> u32 {
        self.0
    }

    pub fn days_f64(&self) -> f64 {
        f64::from(self.0)
    }

    /// Calendar date of `as_of` in its own offset.
    pub fn today(as_of: &DateTime<FixedOffset>) -> NaiveDate {
        as_of.date_naive()
    }

    /// First calendar day in the window: `today - (days - 1)`.
    pub fn start_date(&self, as_of: &DateTime<FixedOffset>) -> NaiveDate {
        Self::today(as_of)
            .checked_sub_days(Days::new(u64::from(self.0 - 1)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Local midnight of [`Window::start_date`], as an instant.
    pub fn start(&self, as_of: &DateTime<FixedOffset>) -> DateTime<Utc> {
        let midnight = self.start_date(as_of).and_time(NaiveTime::MIN);
        as_of
            .offset()
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| as_of.with_timezone(&Utc))
    }

    /// Whether `ts` falls in `[start, as_of]`.
    pub fn contains(&self, ts: DateTime<Utc>, as_of: &DateTime<FixedOffset>) -> bool {
        ts >= self.start(as_of) && ts <= as_of.with_timezone(&Utc)
    }

    /// Calendar date of `ts` in the offset of `as_of`.
    pub fn local_date(ts: DateTime<Utc>, as_of: &DateTime<FixedOffset>) -> NaiveDate {
        ts.with_timezone(as_of.offset()).date_naive()
    }

    /// Every date in the window, oldest first.
    pub fn dates(&self, as_of: &DateTime<FixedOffset>) -> impl Iterator<Item = NaiveDate> {
        self.start_date(as_of).iter_days().take(self.0 as usize)
    }
}

impl TryFrom<u32> for Window {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Window> for u32 {
    fn from(value: Window) -> Self {
        value.0
    }
}
