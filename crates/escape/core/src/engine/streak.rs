//! Streak transition rule.

/// How a completion event affected the streak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StreakChange {
    /// First success ever recorded for the user.
    Started,
    /// Success on the day after the previous event.
    Extended,
    /// Another success on a day that already counted.
    Held,
    /// Success after a gap of more than one day, or from a skewed clock.
    Restarted,
    /// Failed attempt; the streak is left alone.
    Unaffected,
}

/// Computes the next streak value.
///
/// `gap` is the calendar-day distance from the previous event, `None` when
/// there was no previous event.
pub(crate) fn next_streak(streak: u64, gap: Option<i64>, success: bool) -> (u64, StreakChange) {
    if !success {
        return (streak, StreakChange::Unaffected);
    }

    match gap {
        None => (1, StreakChange::Started),
        Some(1) => (streak.saturating_add(1), StreakChange::Extended),
        Some(0) => (streak, StreakChange::Held),
        Some(_) => (1, StreakChange::Restarted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_never_moves_the_streak() {
        for gap in [None, Some(-1), Some(0), Some(1), Some(7)] {
            assert_eq!(next_streak(5, gap, false), (5, StreakChange::Unaffected));
        }
    }

    #[test]
    fn success_follows_the_day_gap() {
        assert_eq!(next_streak(0, None, true), (1, StreakChange::Started));
        assert_eq!(next_streak(3, Some(1), true), (4, StreakChange::Extended));
        assert_eq!(next_streak(3, Some(0), true), (3, StreakChange::Held));
        assert_eq!(next_streak(3, Some(2), true), (1, StreakChange::Restarted));
        assert_eq!(next_streak(3, Some(-1), true), (1, StreakChange::Restarted));
    }

    #[test]
    fn held_streak_of_zero_stays_zero() {
        // A failure-only day followed by a same-day success keeps the zero.
        assert_eq!(next_streak(0, Some(0), true), (0, StreakChange::Held));
    }

    #[test]
    fn labels_are_snake_case() {
        assert_eq!(StreakChange::Restarted.to_string(), "restarted");
        let label: &'static str = StreakChange::Unaffected.into();
        assert_eq!(label, "unaffected");
    }
}
