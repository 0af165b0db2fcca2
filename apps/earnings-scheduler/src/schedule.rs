//! When the monthly aggregation runs.
//!
//! ```text
//!   Mar 1 00:00      Mar 1 00:05                      Apr 1 00:05
//!   ─────┼───────────────┼──────────────────────────────────┼─────►
//!        │◄── delay ────►│ aggregate February               │ aggregate March
//! ```

use chrono::{DateTime, Duration, Utc};

use royalty_core::Period;

/// The first run instant strictly after `now`.
pub fn next_run_at(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    let current = Period::containing(now);
    let this_month = current.start() + delay;
    if this_month > now {
        this_month
    } else {
        current.next().start() + delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_mid_month_waits_for_next_month() {
        let next = next_run_at(utc(2025, 3, 14, 9, 30), Duration::minutes(5));
        assert_eq!(next, utc(2025, 4, 1, 0, 5));
    }

    #[test]
    fn test_inside_delay_runs_this_month() {
        let next = next_run_at(utc(2025, 3, 1, 0, 2), Duration::minutes(5));
        assert_eq!(next, utc(2025, 3, 1, 0, 5));
    }

    #[test]
    fn test_exact_run_instant_moves_on() {
        let next = next_run_at(utc(2025, 3, 1, 0, 5), Duration::minutes(5));
        assert_eq!(next, utc(2025, 4, 1, 0, 5));
    }

    #[test]
    fn test_year_rollover() {
        let next = next_run_at(utc(2025, 12, 31, 23, 59), Duration::zero());
        assert_eq!(next, utc(2026, 1, 1, 0, 0));
    }
}
