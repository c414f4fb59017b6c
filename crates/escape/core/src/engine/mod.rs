//! Completion-event reducer for [`UserStats`].
//!
//! The [`StatsEngine`] is the authoritative reducer for a user's record. It
//! applies exactly one completion event per call and reports what changed so
//! the service layer can log and publish it. Nothing here performs I/O or
//! reads a clock; `now` is always supplied by the caller.

mod streak;

pub use streak::StreakChange;

use crate::calendar::day_gap;
use crate::state::{Timestamp, UserId, UserStats};

/// Outcome of applying one completion event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsTransition {
    /// Whether the attempt succeeded.
    pub success: bool,

    /// Effect on the streak.
    pub streak_change: StreakChange,

    /// Streak before the event.
    pub previous_streak: u64,

    /// Calendar days since the previous event, `None` for the first event.
    pub day_gap: Option<i64>,

    /// True when `today_escapes` restarted at 1.
    pub day_rolled_over: bool,
}

/// Reducer over a single user's record.
///
/// Counters saturate instead of wrapping; a record never goes backwards.
pub struct StatsEngine<'a> {
    stats: &'a mut UserStats,
}

impl<'a> StatsEngine<'a> {
    /// Creates an engine over the given record.
    pub fn new(stats: &'a mut UserStats) -> Self {
        Self { stats }
    }

    /// Applies one completion event that happened at `now`.
    ///
    /// Must be called once per logical event; replays double-count.
    pub fn record(&mut self, success: bool, now: Timestamp) -> StatsTransition {
        let stats = &mut *self.stats;
        let gap = stats.last_escape.map(|last| day_gap(last, now));

        stats.total_escapes = stats.total_escapes.saturating_add(1);

        let day_rolled_over = gap != Some(0);
        stats.today_escapes = if day_rolled_over {
            1
        } else {
            stats.today_escapes.saturating_add(1)
        };

        let previous_streak = stats.streak;
        let (streak, streak_change) = streak::next_streak(previous_streak, gap, success);
        stats.streak = streak;

        stats.last_escape = Some(now);

        StatsTransition {
            success,
            streak_change,
            previous_streak,
            day_gap: gap,
            day_rolled_over,
        }
    }
}

/// Produces the next record for `user_id` from its prior record.
///
/// A missing prior record is initialized with `join_date = now` before the
/// event is applied.
pub fn apply(
    prior: Option<UserStats>,
    user_id: &UserId,
    success: bool,
    now: Timestamp,
) -> UserStats {
    apply_with_transition(prior, user_id, success, now).0
}

/// Like [`apply`], also returning the [`StatsTransition`].
pub fn apply_with_transition(
    prior: Option<UserStats>,
    user_id: &UserId,
    success: bool,
    now: Timestamp,
) -> (UserStats, StatsTransition) {
    let mut stats = prior.unwrap_or_else(|| UserStats::new(user_id.clone(), now));
    let transition = StatsEngine::new(&mut stats).record(success, now);
    (stats, transition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn alice() -> UserId {
        UserId::parse("alice").unwrap()
    }

    #[test]
    fn first_success_bootstraps_record() {
        let now = at(2024, 1, 1, 10);
        let stats = apply(None, &alice(), true, now);

        assert_eq!(stats.join_date, now);
        assert_eq!(stats.total_escapes, 1);
        assert_eq!(stats.today_escapes, 1);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.last_escape, Some(now));
    }

    #[test]
    fn first_failure_leaves_streak_at_zero() {
        let (stats, transition) = apply_with_transition(None, &alice(), false, at(2024, 1, 1, 10));

        assert_eq!(stats.streak, 0);
        assert_eq!(stats.total_escapes, 1);
        assert_eq!(stats.today_escapes, 1);
        assert_eq!(transition.streak_change, StreakChange::Unaffected);
        assert_eq!(transition.day_gap, None);

        let next = apply(Some(stats), &alice(), true, at(2024, 1, 2, 10));
        assert_eq!(next.streak, 1);
    }

    #[test]
    fn worked_example_extend_hold_restart() {
        let mut stats = UserStats::new(alice(), at(2023, 12, 20, 8));
        stats.total_escapes = 10;
        stats.today_escapes = 2;
        stats.streak = 3;
        stats.last_escape = Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());

        let (stats, t) = apply_with_transition(Some(stats), &alice(), true, at(2024, 1, 2, 9));
        assert_eq!(stats.streak, 4);
        assert_eq!(stats.today_escapes, 1);
        assert_eq!(stats.total_escapes, 11);
        assert_eq!(t.streak_change, StreakChange::Extended);
        assert!(t.day_rolled_over);

        let (stats, t) = apply_with_transition(Some(stats), &alice(), true, at(2024, 1, 2, 18));
        assert_eq!(stats.streak, 4);
        assert_eq!(stats.today_escapes, 2);
        assert_eq!(stats.total_escapes, 12);
        assert_eq!(t.streak_change, StreakChange::Held);
        assert!(!t.day_rolled_over);

        let (stats, t) = apply_with_transition(Some(stats), &alice(), true, at(2024, 1, 5, 9));
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.today_escapes, 1);
        assert_eq!(stats.total_escapes, 13);
        assert_eq!(t.streak_change, StreakChange::Restarted);
        assert_eq!(t.day_gap, Some(3));
    }

    #[test]
    fn failure_keeps_streak_but_counts() {
        let stats = apply(None, &alice(), true, at(2024, 1, 1, 9));
        let stats = apply(Some(stats), &alice(), true, at(2024, 1, 2, 9));
        assert_eq!(stats.streak, 2);

        let stats = apply(Some(stats), &alice(), false, at(2024, 1, 9, 9));
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.total_escapes, 3);
        assert_eq!(stats.today_escapes, 1);
        assert_eq!(stats.last_escape, Some(at(2024, 1, 9, 9)));
    }

    #[test]
    fn skewed_clock_restarts_streak() {
        let stats = apply(None, &alice(), true, at(2024, 1, 5, 9));
        let stats = apply(Some(stats), &alice(), true, at(2024, 1, 6, 9));
        assert_eq!(stats.streak, 2);

        let (stats, t) = apply_with_transition(Some(stats), &alice(), true, at(2024, 1, 4, 9));
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.today_escapes, 1);
        assert_eq!(t.day_gap, Some(-2));
    }

    #[test]
    fn join_date_is_never_rewritten() {
        let joined = at(2024, 1, 1, 7);
        let mut stats = apply(None, &alice(), false, joined);
        for day in 2..6 {
            stats = apply(Some(stats), &alice(), true, at(2024, 1, day, 12));
        }
        assert_eq!(stats.join_date, joined);
    }

    #[test]
    fn many_same_day_events_count_today() {
        let start = at(2024, 3, 10, 0);
        let mut stats = None;
        for i in 0..24 {
            stats = Some(apply(stats, &alice(), i % 2 == 0, start + Duration::minutes(59 * i)));
        }
        let stats = stats.unwrap();
        assert_eq!(stats.today_escapes, 24);
        assert_eq!(stats.total_escapes, 24);
        assert_eq!(stats.streak, 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeSet;

        use crate::calendar::CalendarDay;

        // (minutes since the previous event, success)
        fn events() -> impl Strategy<Value = Vec<(i64, bool)>> {
            prop::collection::vec((0i64..4 * 24 * 60, any::<bool>()), 1..60)
        }

        proptest! {
            #[test]
            fn counters_hold_invariants(steps in events()) {
                let mut now = at(2024, 1, 1, 0);
                let mut stats: Option<UserStats> = None;
                let mut success_days = BTreeSet::new();
                let mut same_day = 0u64;
                let mut last_day: Option<CalendarDay> = None;

                for (k, (advance, success)) in steps.iter().enumerate() {
                    now += Duration::minutes(*advance);
                    let day = CalendarDay::of(now);
                    same_day = if last_day == Some(day) { same_day + 1 } else { 1 };
                    last_day = Some(day);
                    if *success {
                        success_days.insert(day);
                    }

                    let next = apply(stats.take(), &alice(), *success, now);

                    prop_assert_eq!(next.total_escapes, k as u64 + 1);
                    prop_assert_eq!(next.today_escapes, same_day);
                    prop_assert!(next.today_escapes <= next.total_escapes);
                    prop_assert!(next.streak <= success_days.len() as u64);
                    prop_assert!(next.validate().is_ok());
                    stats = Some(next);
                }
            }

            #[test]
            fn failures_are_streak_neutral(steps in events()) {
                let mut now = at(2024, 1, 1, 0);
                let mut stats = apply(None, &alice(), true, now);

                for (advance, success) in steps {
                    now += Duration::minutes(advance);
                    let before = stats.streak;
                    stats = apply(Some(stats), &alice(), success, now);
                    if !success {
                        prop_assert_eq!(stats.streak, before);
                    }
                }
            }
        }
    }
}
