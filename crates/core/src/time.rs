use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Returns the current calendar day in the fixed reference calendar (UTC).
    ///
    /// Streak bookkeeping always uses this day, never the viewer's local
    /// zone, so two reloads either side of a local midnight agree.
    #[must_use]
    pub fn today(&self) -> CalendarDay {
        CalendarDay(self.now().date_naive())
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Returns true if this clock represents real time.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Clock::Default)
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Error parsing a `YYYY-MM-DD` day string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed calendar day: {raw}")]
pub struct CalendarDayError {
    pub raw: String,
}

/// One day in the fixed reference calendar (UTC), serialized as `YYYY-MM-DD`.
///
/// Day arithmetic is done on the dates themselves, never through local-time
/// instants, so daylight-saving shifts cannot skew a difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Absolute number of whole calendar days between two days.
    #[must_use]
    pub fn difference(self, other: Self) -> u32 {
        let gap = (other.0 - self.0).num_days().unsigned_abs();
        u32::try_from(gap).unwrap_or(u32::MAX)
    }

    /// The day `n` days after this one.
    #[must_use]
    pub fn plus_days(self, n: i64) -> Self {
        Self(self.0 + Duration::days(n))
    }
}

/// Absolute day gap between two optional days; `None` if either is absent.
#[must_use]
pub fn day_difference(a: Option<CalendarDay>, b: Option<CalendarDay>) -> Option<u32> {
    Some(a?.difference(b?))
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDay {
    type Err = CalendarDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| CalendarDayError { raw: s.to_owned() })
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_ymd() {
        let day: CalendarDay = "2024-03-09".parse().unwrap();
        assert_eq!(day.to_string(), "2024-03-09");
    }

    #[test]
    fn rejects_malformed_day() {
        assert!("2024-3-9x".parse::<CalendarDay>().is_err());
        assert!("not-a-day".parse::<CalendarDay>().is_err());
    }

    #[test]
    fn difference_is_absolute_and_dst_free() {
        let a: CalendarDay = "2024-03-30".parse().unwrap();
        // DST switch weekend in most of Europe; pure date math ignores it.
        let b: CalendarDay = "2024-04-01".parse().unwrap();
        assert_eq!(a.difference(b), 2);
        assert_eq!(b.difference(a), 2);
        assert_eq!(a.difference(a), 0);
    }

    #[test]
    fn day_difference_requires_both_days() {
        let a: CalendarDay = "2024-01-01".parse().unwrap();
        assert_eq!(day_difference(Some(a), None), None);
        assert_eq!(day_difference(None, Some(a)), None);
        assert_eq!(day_difference(Some(a), Some(a.plus_days(3))), Some(3));
    }

    #[test]
    fn fixed_clock_today_is_utc_date() {
        let clock = fixed_clock();
        assert_eq!(clock.today().to_string(), "2023-11-14");
    }
}
