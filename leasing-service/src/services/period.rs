//! Calendar arithmetic for line periods.

use chrono::{Datelike, NaiveDate};

/// Days from `from` to `to`, exclusive of `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole calendar months elapsed from `from` to `to`.
///
/// A month counts once the day-of-month of `from` is reached again, with
/// month-end clamping: Jan 31 to Feb 28 is one month in a common year.
/// Returns 0 when `to` is before `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to < from {
        return 0;
    }

    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() && !is_month_end(to) {
        months -= 1;
    }
    months.max(0) as u32
}

/// Whole years elapsed from `from` to `to`.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> u32 {
    months_between(from, to) / 12
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_are_exclusive_of_end() {
        assert_eq!(days_between(date(2026, 1, 1), date(2026, 1, 10)), 9);
        assert_eq!(days_between(date(2026, 1, 1), date(2026, 1, 1)), 0);
        assert_eq!(days_between(date(2024, 1, 1), date(2025, 1, 1)), 366);
    }

    #[test]
    fn months_count_completed_months_only() {
        assert_eq!(months_between(date(2026, 1, 15), date(2026, 2, 14)), 0);
        assert_eq!(months_between(date(2026, 1, 15), date(2026, 2, 15)), 1);
        assert_eq!(months_between(date(2026, 1, 1), date(2026, 12, 31)), 11);
        assert_eq!(months_between(date(2026, 1, 1), date(2027, 1, 1)), 12);
    }

    #[test]
    fn month_end_clamps() {
        assert_eq!(months_between(date(2026, 1, 31), date(2026, 2, 28)), 1);
        assert_eq!(months_between(date(2024, 1, 31), date(2024, 2, 28)), 0);
        assert_eq!(months_between(date(2024, 1, 31), date(2024, 2, 29)), 1);
    }

    #[test]
    fn years_follow_months() {
        assert_eq!(years_between(date(2026, 3, 1), date(2027, 2, 28)), 0);
        assert_eq!(years_between(date(2026, 3, 1), date(2027, 3, 1)), 1);
        assert_eq!(years_between(date(2024, 2, 29), date(2025, 2, 28)), 1);
    }

    #[test]
    fn reversed_range_yields_zero() {
        assert_eq!(months_between(date(2026, 5, 1), date(2026, 1, 1)), 0);
        assert_eq!(years_between(date(2026, 5, 1), date(2020, 1, 1)), 0);
    }
}
