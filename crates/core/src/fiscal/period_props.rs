//! Property-based tests for fiscal year ranges.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use super::period::{FiscalYear, date_ranges_overlap, ensure_no_overlap, ensure_posting_allowed};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

/// Strategy for a `[start, end]` pair with `end > start`.
fn range_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (0u64..2_000, 1u64..400).prop_map(|(offset, len)| {
        let start = base() + Days::new(offset);
        (start, start + Days::new(len))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Overlap is symmetric.
    #[test]
    fn prop_overlap_is_symmetric(a in range_strategy(), b in range_strategy()) {
        prop_assert_eq!(
            date_ranges_overlap(a.0, a.1, b.0, b.1),
            date_ranges_overlap(b.0, b.1, a.0, a.1)
        );
    }

    /// Overlap holds exactly when some day belongs to both ranges.
    #[test]
    fn prop_overlap_matches_shared_day(a in range_strategy(), b in range_strategy()) {
        let latest_start = a.0.max(b.0);
        let earliest_end = a.1.min(b.1);
        prop_assert_eq!(date_ranges_overlap(a.0, a.1, b.0, b.1), latest_start <= earliest_end);
    }

    /// A year that starts the day after another ends never conflicts with it.
    #[test]
    fn prop_adjacent_years_do_not_overlap((start, end) in range_strategy(), len in 1u64..400) {
        let existing = FiscalYear { id: 1, start_date: start, end_date: end, closed: false };
        let next_start = end + Days::new(1);
        prop_assert!(ensure_no_overlap(next_start, next_start + Days::new(len), [&existing]).is_ok());
    }

    /// Every date inside an open year may be posted to.
    #[test]
    fn prop_dates_inside_open_year_allow_posting((start, end) in range_strategy(), pick in 0u64..400) {
        let year = FiscalYear { id: 1, start_date: start, end_date: end, closed: false };
        let span = (end - start).num_days().unsigned_abs();
        let date = start + Days::new(pick % (span + 1));
        prop_assert!(ensure_posting_allowed(date, Some(&year)).is_ok());
    }
}
