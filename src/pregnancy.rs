//! Pregnancy stage calculation
//!
//! Derives gestational week, trimester, due date and progress from a
//! last-menstrual-period (LMP) date. Everything here is pure: the reference
//! date is always passed in, never read from the clock.

use chrono::{Days, NaiveDate};

use crate::profile::{parse_date, UserProfile};
use crate::types::{GestationalStatus, Trimester};

/// Naegele's rule: due date is LMP + 280 days
pub const PREGNANCY_DURATION_DAYS: u64 = 280;

/// Full-term length used for progress
pub const FULL_TERM_WEEKS: u32 = 40;

/// Last week (inclusive) of the first trimester
pub const FIRST_TRIMESTER_LAST_WEEK: u32 = 13;

/// Last week (inclusive) of the second trimester
pub const SECOND_TRIMESTER_LAST_WEEK: u32 = 26;

/// Calculator for deriving gestational status from an LMP date
pub struct PregnancyStageCalculator;

impl PregnancyStageCalculator {
    /// Compute gestational status for `lmp` as seen on `now`.
    ///
    /// An LMP after `now` clamps the week to 0; the due date is still LMP + 280.
    /// An LMP whose due date falls past the end of the calendar gives the
    /// "no data" status.
    pub fn compute(lmp: NaiveDate, now: NaiveDate) -> GestationalStatus {
        let Some(due_date) = due_date_for(lmp) else {
            tracing::warn!(%lmp, "due date is not representable, reporting no data");
            return GestationalStatus::default();
        };
        let days_since = (now - lmp).num_days();

        if days_since < 0 {
            tracing::warn!(%lmp, %now, "last period date is in the future, clamping to week 0");
        }

        let elapsed = days_since.max(0);
        let current_week = u32::try_from(elapsed / 7).unwrap_or(u32::MAX);
        let day_of_week = (elapsed % 7) as u32;

        let status = GestationalStatus {
            current_week,
            day_of_week,
            trimester: Trimester::from_week(current_week),
            due_date: Some(due_date),
            days_until_due: (due_date - now).num_days(),
            progress_percent: progress_for_week(current_week),
        };

        tracing::debug!(
            week = status.current_week,
            trimester = status.trimester.as_str(),
            progress = status.progress_percent,
            "computed gestational status"
        );

        status
    }

    /// Compute status from an optional LMP; missing dates give the "no data" status.
    pub fn compute_optional(lmp: Option<NaiveDate>, now: NaiveDate) -> GestationalStatus {
        match lmp {
            Some(lmp) => Self::compute(lmp, now),
            None => GestationalStatus::default(),
        }
    }

    /// Compute status from a date string; unparseable input gives the "no data" status.
    pub fn compute_from_str(lmp: &str, now: NaiveDate) -> GestationalStatus {
        let parsed = parse_date(lmp);
        if parsed.is_none() {
            tracing::warn!(lmp, "unparseable last period date, reporting no data");
        }
        Self::compute_optional(parsed, now)
    }

    /// Compute status from a profile snapshot
    pub fn compute_for_profile(profile: &UserProfile, now: NaiveDate) -> GestationalStatus {
        Self::compute_optional(profile.last_period_date, now)
    }
}

/// Estimated due date for an LMP, `None` past the end of the calendar
pub fn due_date_for(lmp: NaiveDate) -> Option<NaiveDate> {
    lmp.checked_add_days(Days::new(PREGNANCY_DURATION_DAYS))
}

/// Progress towards full term, `round(week / 40 * 100)` capped at 100.
///
/// Halves round up, so week 1 is 3%.
pub fn progress_for_week(week: u32) -> u8 {
    let term = u64::from(FULL_TERM_WEEKS);
    let percent = (u64::from(week) * 200 + term) / (2 * term);
    percent.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_hundred_days_is_second_trimester() {
        let now = date(2024, 6, 1);
        let lmp = now - Duration::days(100);
        let status = PregnancyStageCalculator::compute(lmp, now);

        assert_eq!(status.current_week, 14);
        assert_eq!(status.day_of_week, 2);
        assert_eq!(status.trimester, Trimester::Second);
        assert_eq!(status.progress_percent, 35);
        assert_eq!(status.days_until_due, 180);
    }

    #[test]
    fn test_due_date_is_lmp_plus_280() {
        let now = date(2024, 6, 1);
        for offset in [0, 1, 45, 139, 280, 301] {
            let lmp = now - Duration::days(offset);
            let status = PregnancyStageCalculator::compute(lmp, now);
            let due = status.due_date.unwrap();
            assert_eq!((due - lmp).num_days(), 280);
        }
    }

    #[test]
    fn test_leap_year_due_date() {
        let status = PregnancyStageCalculator::compute(date(2023, 6, 1), date(2023, 6, 1));
        assert_eq!(status.due_date, Some(date(2024, 3, 7)));
        assert_eq!(status.current_week, 0);
    }

    #[test]
    fn test_future_lmp_clamps_to_zero() {
        let now = date(2024, 6, 1);
        let status = PregnancyStageCalculator::compute(now + Duration::days(10), now);

        assert_eq!(status.current_week, 0);
        assert_eq!(status.day_of_week, 0);
        assert_eq!(status.trimester, Trimester::First);
        assert_eq!(status.progress_percent, 0);
        assert_eq!(status.days_until_due, 290);
    }

    #[test]
    fn test_due_date_round_trip_gives_week_zero() {
        let now = date(2024, 6, 1);
        let lmp = now - Duration::days(63);
        let first = PregnancyStageCalculator::compute(lmp, now);
        let second = PregnancyStageCalculator::compute(first.due_date.unwrap(), now);

        assert_eq!(second.current_week, 0);
    }

    #[test]
    fn test_trimester_boundaries_inclusive() {
        assert_eq!(Trimester::from_week(0), Trimester::First);
        assert_eq!(Trimester::from_week(13), Trimester::First);
        assert_eq!(Trimester::from_week(14), Trimester::Second);
        assert_eq!(Trimester::from_week(26), Trimester::Second);
        assert_eq!(Trimester::from_week(27), Trimester::Third);
        assert_eq!(Trimester::from_week(45), Trimester::Third);
    }

    #[test]
    fn test_trimester_monotonic() {
        let mut previous = Trimester::First;
        for week in 0..=60 {
            let current = Trimester::from_week(week);
            assert!(current >= previous, "trimester went backwards at week {week}");
            previous = current;
        }
    }

    #[test]
    fn test_progress_clamped() {
        for week in 0..=1000 {
            assert!(progress_for_week(week) <= 100);
        }
        assert_eq!(progress_for_week(0), 0);
        assert_eq!(progress_for_week(1), 3);
        assert_eq!(progress_for_week(20), 50);
        assert_eq!(progress_for_week(40), 100);
        assert_eq!(progress_for_week(u32::MAX), 100);
    }

    #[test]
    fn test_overdue_is_permitted() {
        let now = date(2024, 6, 1);
        let status = PregnancyStageCalculator::compute(now - Duration::days(294), now);

        assert_eq!(status.current_week, 42);
        assert_eq!(status.trimester, Trimester::Third);
        assert_eq!(status.progress_percent, 100);
        assert!(status.is_overdue());
        assert_eq!(status.days_until_due, -14);
    }

    #[test]
    fn test_missing_lmp_gives_default() {
        let status = PregnancyStageCalculator::compute_optional(None, date(2024, 6, 1));
        assert_eq!(status, GestationalStatus::default());
    }

    #[test]
    fn test_end_of_calendar_lmp_gives_no_data() {
        let now = NaiveDate::MAX;
        let status = PregnancyStageCalculator::compute(NaiveDate::MAX - Duration::days(10), now);
        assert_eq!(status, GestationalStatus::default());

        let status = PregnancyStageCalculator::compute(NaiveDate::MAX, date(2024, 6, 1));
        assert_eq!(status, GestationalStatus::default());
        assert_eq!(due_date_for(NaiveDate::MAX), None);
    }

    #[test]
    fn test_latest_representable_lmp() {
        let lmp = NaiveDate::MAX - Duration::days(280);
        let status = PregnancyStageCalculator::compute(lmp, lmp);
        assert_eq!(status.due_date, Some(NaiveDate::MAX));
        assert_eq!(status.days_until_due, 280);
    }

    #[test]
    fn test_compute_from_str() {
        let now = date(2024, 6, 1);
        let status = PregnancyStageCalculator::compute_from_str("2024-02-22", now);
        assert_eq!(status.current_week, 14);

        let status = PregnancyStageCalculator::compute_from_str("next tuesday", now);
        assert_eq!(status, GestationalStatus::default());

        let near_end = (NaiveDate::MAX - Duration::days(30)).format("%Y-%m-%d").to_string();
        let status = PregnancyStageCalculator::compute_from_str(&near_end, now);
        assert_eq!(status, GestationalStatus::default());
    }

    #[test]
    fn test_compute_for_profile_reads_snapshot() {
        let now = date(2024, 6, 1);
        let profile = UserProfile {
            last_period_date: Some(now - Duration::days(200)),
            ..Default::default()
        };
        let status = PregnancyStageCalculator::compute_for_profile(&profile, now);

        assert_eq!(status.current_week, 28);
        assert_eq!(status.trimester, Trimester::Third);
        assert_eq!(status.progress_percent, 70);
    }
}
