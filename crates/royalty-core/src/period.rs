//! # Periods
//!
//! A `Period` is one calendar month, the bucket used for earnings rollups
//! and month-over-month dashboards.
//!
//! ## Boundaries
//! ```text
//! Period 2026-03
//!   start = 2026-03-01T00:00:00Z   (inclusive)
//!   end   = 2026-04-01T00:00:00Z   (exclusive)
//!
//! A sale at 2026-03-31T23:59:59.999Z belongs to 2026-03.
//! A sale at 2026-04-01T00:00:00.000Z belongs to 2026-04.
//! ```
//! All boundaries are UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Serialized shape of a period: `{ "year": 2026, "month": 3 }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PeriodParts {
    year: i32,
    month: u32,
}

/// One calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodParts", into = "PeriodParts")]
pub struct Period {
    first_day: NaiveDate,
}

impl Period {
    /// Creates a period for `year`/`month` (1-12).
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CoreError::invalid(format!(
                "year must be between {} and {}, got {}",
                MIN_YEAR, MAX_YEAR, year
            )));
        }
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| CoreError::invalid(format!("month must be 1-12, got {}", month)))?;
        Ok(Period { first_day })
    }

    /// The period containing `instant`.
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let date = instant.date_naive();
        Period {
            first_day: date - chrono::Days::new(u64::from(date.day0())),
        }
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    #[inline]
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Exclusive upper bound (start of the next period).
    pub fn end(&self) -> DateTime<Utc> {
        self.next().start()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start() && instant < self.end()
    }

    pub fn next(&self) -> Self {
        Period {
            first_day: self.first_day + Months::new(1),
        }
    }

    pub fn previous(&self) -> Self {
        Period {
            first_day: self.first_day - Months::new(1),
        }
    }

    /// The period `n` months before this one.
    pub fn months_back(&self, n: u32) -> Self {
        Period {
            first_day: self.first_day - Months::new(n),
        }
    }

    /// Short month label (`"Jan"`..`"Dec"`).
    pub fn month_label(&self) -> &'static str {
        MONTH_LABELS[self.first_day.month0() as usize]
    }

    /// January of this period's year.
    pub fn start_of_year(&self) -> Self {
        Period {
            first_day: self.first_day.with_month(1).unwrap_or(self.first_day),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Parses `"YYYY-MM"`.
impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| CoreError::invalid(format!("period must be YYYY-MM, got '{}'", s)))?;
        let year: i32 = year
            .parse()
            .map_err(|_| CoreError::invalid(format!("invalid year in period '{}'", s)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| CoreError::invalid(format!("invalid month in period '{}'", s)))?;
        Period::new(year, month)
    }
}

impl TryFrom<PeriodParts> for Period {
    type Error = CoreError;

    fn try_from(parts: PeriodParts) -> Result<Self, Self::Error> {
        Period::new(parts.year, parts.month)
    }
}

impl From<Period> for PeriodParts {
    fn from(period: Period) -> Self {
        PeriodParts {
            year: period.year(),
            month: period.month(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_boundaries_are_half_open() {
        let march = Period::new(2026, 3).unwrap();
        assert_eq!(march.start(), Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(march.end(), Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap());

        let last_instant = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap();
        assert!(march.contains(last_instant));
        assert!(!march.contains(march.end()));
    }

    #[test]
    fn test_year_rollover() {
        let january = Period::new(2026, 1).unwrap();
        assert_eq!(january.previous(), Period::new(2025, 12).unwrap());
        assert_eq!(Period::new(2025, 12).unwrap().next(), january);
        assert_eq!(january.months_back(13), Period::new(2024, 12).unwrap());
    }

    #[test]
    fn test_containing() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        let period = Period::containing(instant);
        assert_eq!((period.year(), period.month()), (2026, 10));
        assert_eq!(period.month_label(), "Oct");
        assert_eq!(period.start_of_year(), Period::new(2026, 1).unwrap());
    }

    #[test]
    fn test_parse_and_display() {
        let period: Period = "2026-03".parse().unwrap();
        assert_eq!(period.to_string(), "2026-03");
        assert!("2026-13".parse::<Period>().is_err());
        assert!("march".parse::<Period>().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let period = Period::new(2026, 3).unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert_eq!(json, r#"{"year":2026,"month":3}"#);
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }
}
