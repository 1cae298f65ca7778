//! Continuous-achievement-streak computation.
//!
//! A streak is a run of consecutive calendar days each containing at
//! least one achievement. Calendar days are UTC dates: `occurred_at` is
//! reduced with `DateTime::<Utc>::date_naive()`, so day boundaries do not
//! depend on server locale. Multiple achievements on the same day count
//! as one streak day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agenda::Achievement;

/// Current and all-time-best streak lengths, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StreakReport {
    /// Length of the run ending at (or adjacent to) `today`; zero when
    /// the most recent achievement is older than yesterday.
    pub current: u32,
    /// Longest run anywhere in the history.
    pub max: u32,
}

/// Compute the streak over a multiset of achievement dates.
///
/// The result is invariant under input reordering and under duplicate
/// dates. The run containing the most recent date counts as `current`
/// only when that date is `today` or the day before; otherwise the
/// active streak is broken and `current` is zero while `max` still
/// reflects the full history.
pub fn compute_streak(dates: &[NaiveDate], today: NaiveDate) -> StreakReport {
    let mut days: Vec<NaiveDate> = dates.to_vec();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    if days.is_empty() {
        return StreakReport::default();
    }

    let mut max = 1u32;
    let mut run = 1u32;
    // Length of the run that contains the most recent date.
    let mut anchor_run = 1u32;
    let mut in_anchor_run = true;

    for pair in days.windows(2) {
        let gap = pair[0].signed_duration_since(pair[1]).num_days();
        if gap == 1 {
            run += 1;
            if in_anchor_run {
                anchor_run = run;
            }
        } else {
            run = 1;
            in_anchor_run = false;
        }
        if run > max {
            max = run;
        }
    }

    let age_days = today.signed_duration_since(days[0]).num_days();
    let current = if age_days <= 1 { anchor_run } else { 0 };

    StreakReport { current, max }
}

/// Reduce achievements to their UTC calendar dates.
///
/// Records with a missing timestamp are excluded with a logged warning
/// rather than failing the computation.
pub fn achievement_dates(achievements: &[Achievement]) -> Vec<NaiveDate> {
    achievements
        .iter()
        .filter_map(|ach| match ach.occurred_at {
            Some(ts) => Some(to_utc_date(ts)),
            None => {
                warn!(achievement_id = %ach.id, "achievement has no timestamp; excluded from streak");
                None
            }
        })
        .collect()
}

/// Compute the streak directly from achievement records.
pub fn streak_from_achievements(achievements: &[Achievement], today: NaiveDate) -> StreakReport {
    compute_streak(&achievement_dates(achievements), today)
}

fn to_utc_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn day(offset_from_today: i64) -> NaiveDate {
        Utc::now().date_naive() - Duration::days(offset_from_today)
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[test]
    fn empty_input_yields_zero() {
        assert_eq!(compute_streak(&[], today()), StreakReport { current: 0, max: 0 });
    }

    #[test]
    fn single_date_today() {
        let report = compute_streak(&[day(0)], today());
        assert_eq!(report, StreakReport { current: 1, max: 1 });
    }

    #[test]
    fn single_old_date_breaks_current_but_counts_for_max() {
        let report = compute_streak(&[day(5)], today());
        assert_eq!(report, StreakReport { current: 0, max: 1 });
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let report = compute_streak(&[day(0), day(1), day(2)], today());
        assert_eq!(report, StreakReport { current: 3, max: 3 });
    }

    #[test]
    fn gap_breaks_the_run() {
        // Today plus an isolated date three days back: two runs of one.
        let report = compute_streak(&[day(0), day(3)], today());
        assert_eq!(report, StreakReport { current: 1, max: 1 });
    }

    #[test]
    fn yesterday_anchor_keeps_streak_alive() {
        let report = compute_streak(&[day(1), day(2)], today());
        assert_eq!(report, StreakReport { current: 2, max: 2 });
    }

    #[test]
    fn stale_anchor_zeroes_current_only() {
        let report = compute_streak(&[day(2), day(3)], today());
        assert_eq!(report, StreakReport { current: 0, max: 2 });
    }

    #[test]
    fn older_longer_run_wins_max() {
        // Current run of 2 ending today, older run of 4.
        let dates = [day(0), day(1), day(5), day(6), day(7), day(8)];
        let report = compute_streak(&dates, today());
        assert_eq!(report, StreakReport { current: 2, max: 4 });
    }

    #[test]
    fn duplicate_dates_collapse() {
        let report = compute_streak(&[day(0), day(0), day(1), day(1), day(1)], today());
        assert_eq!(report, StreakReport { current: 2, max: 2 });
    }

    #[test]
    fn missing_timestamps_are_excluded() {
        let mut with_ts = Achievement::new("u", "a", Utc::now());
        with_ts.occurred_at = Some(Utc::now());
        let mut without_ts = Achievement::new("u", "b", Utc::now());
        without_ts.occurred_at = None;

        let dates = achievement_dates(&[with_ts, without_ts]);
        assert_eq!(dates.len(), 1);
    }

    proptest! {
        #[test]
        fn invariant_under_reordering(mut offsets in proptest::collection::vec(0i64..60, 0..40)) {
            let anchor = today();
            let dates: Vec<NaiveDate> = offsets.iter().map(|o| anchor - Duration::days(*o)).collect();
            let baseline = compute_streak(&dates, anchor);

            offsets.reverse();
            let reversed: Vec<NaiveDate> = offsets.iter().map(|o| anchor - Duration::days(*o)).collect();
            prop_assert_eq!(compute_streak(&reversed, anchor), baseline);
        }

        #[test]
        fn invariant_under_duplication(offsets in proptest::collection::vec(0i64..60, 1..20)) {
            let anchor = today();
            let dates: Vec<NaiveDate> = offsets.iter().map(|o| anchor - Duration::days(*o)).collect();
            let mut doubled = dates.clone();
            doubled.extend_from_slice(&dates);
            prop_assert_eq!(compute_streak(&doubled, anchor), compute_streak(&dates, anchor));
        }
    }
}
