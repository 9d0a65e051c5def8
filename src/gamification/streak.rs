//! Daily-activity streak policy, driven by check-in timestamps.

use chrono::NaiveDate;

/// Next streak value given the previous `last_active` date. Same-day
/// re-entry neither inflates nor resets; exactly one day later extends; any
/// larger gap, or a clock that moved backward, resets to 1.
pub fn next_streak(last_active: Option<NaiveDate>, current: i32, today: NaiveDate) -> i32 {
    let Some(prev) = last_active else {
        return 1;
    };

    match (today - prev).num_days() {
        0 => current,
        1 => current + 1,
        _ => 1,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_check_in_starts_at_one() {
        assert_eq!(next_streak(None, 0, date(2025, 3, 10)), 1);
    }

    #[test]
    fn same_day_re_entry_is_unchanged() {
        let today = date(2025, 3, 10);
        assert_eq!(next_streak(Some(today), 4, today), 4);
    }

    #[test]
    fn consecutive_day_extends() {
        assert_eq!(next_streak(Some(date(2025, 3, 10)), 4, date(2025, 3, 11)), 5);
    }

    #[test]
    fn gap_resets_to_one() {
        assert_eq!(next_streak(Some(date(2025, 3, 10)), 9, date(2025, 3, 13)), 1);
    }

    #[test]
    fn backwards_clock_resets_to_one() {
        assert_eq!(next_streak(Some(date(2025, 3, 10)), 9, date(2025, 3, 9)), 1);
    }

    #[test]
    fn month_boundary_counts_as_consecutive() {
        assert_eq!(next_streak(Some(date(2025, 2, 28)), 2, date(2025, 3, 1)), 3);
    }
}
