use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::models::Tier;

/// Actions subject to daily quotas. Dislikes are deliberately absent: they
/// are never limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaAction {
    Like,
    SuperLike,
    Undo,
}

/// Daily limit per tier; `None` means unlimited.
///
/// Gold and platinum are uncapped across the board, including super likes.
pub fn daily_limit(tier: Tier, action: QuotaAction) -> Option<i64> {
    match (tier, action) {
        (Tier::Free, QuotaAction::Like) => Some(10),
        (Tier::Free, QuotaAction::SuperLike) => Some(1),
        (Tier::Free, QuotaAction::Undo) => Some(1),
        (Tier::Plus, QuotaAction::SuperLike) => Some(5),
        _ => None,
    }
}

pub fn is_allowed(tier: Tier, action: QuotaAction, used_today: i64) -> bool {
    match daily_limit(tier, action) {
        Some(limit) => used_today < limit,
        None => true,
    }
}

/// Turns "today" into an explicit policy instead of an ambient clock read.
/// The service is configured with a fixed UTC offset; quota windows are the
/// local calendar day expressed as a half-open UTC interval.
#[derive(Debug, Clone, Copy)]
pub struct CalendarPolicy {
    offset_minutes: i32,
}

impl CalendarPolicy {
    pub fn with_utc_offset_minutes(offset_minutes: i32) -> Self {
        Self { offset_minutes }
    }

    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        (now + Duration::minutes(self.offset_minutes.into())).date_naive()
    }

    /// Half-open `[start, end)` UTC window covering the local calendar day
    /// containing `now`.
    pub fn day_window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let offset = Duration::minutes(self.offset_minutes.into());
        let local_midnight = (now + offset).date_naive().and_time(NaiveTime::MIN);
        let start = DateTime::<Utc>::from_naive_utc_and_offset(local_midnight - offset, Utc);
        (start, start + Duration::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn free_tier_limits() {
        assert_eq!(daily_limit(Tier::Free, QuotaAction::Like), Some(10));
        assert_eq!(daily_limit(Tier::Free, QuotaAction::SuperLike), Some(1));
        assert_eq!(daily_limit(Tier::Free, QuotaAction::Undo), Some(1));
    }

    #[test]
    fn plus_tier_limits() {
        assert_eq!(daily_limit(Tier::Plus, QuotaAction::Like), None);
        assert_eq!(daily_limit(Tier::Plus, QuotaAction::SuperLike), Some(5));
        assert_eq!(daily_limit(Tier::Plus, QuotaAction::Undo), None);
    }

    #[test]
    fn gold_and_platinum_are_uncapped() {
        for tier in [Tier::Gold, Tier::Platinum] {
            for action in [QuotaAction::Like, QuotaAction::SuperLike, QuotaAction::Undo] {
                assert_eq!(daily_limit(tier, action), None);
            }
        }
    }

    #[test]
    fn tenth_like_allowed_eleventh_rejected() {
        assert!(is_allowed(Tier::Free, QuotaAction::Like, 9));
        assert!(!is_allowed(Tier::Free, QuotaAction::Like, 10));
    }

    #[test]
    fn unlimited_never_rejects() {
        assert!(is_allowed(Tier::Platinum, QuotaAction::SuperLike, 1_000_000));
    }

    #[test]
    fn day_window_is_midnight_to_midnight_utc_without_offset() {
        let policy = CalendarPolicy::with_utc_offset_minutes(0);
        let (start, end) = policy.day_window(at(2024, 6, 15, 13, 37));
        assert_eq!(start, at(2024, 6, 15, 0, 0));
        assert_eq!(end, at(2024, 6, 16, 0, 0));
    }

    #[test]
    fn offset_shifts_the_local_date() {
        // 23:30 UTC is already "tomorrow" one hour east of UTC.
        let policy = CalendarPolicy::with_utc_offset_minutes(60);
        let now = at(2024, 6, 15, 23, 30);
        assert_eq!(policy.local_date(now), NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
        let (start, end) = policy.day_window(now);
        assert_eq!(start, at(2024, 6, 15, 23, 0));
        assert_eq!(end, at(2024, 6, 16, 23, 0));
        assert!(start <= now && now < end);
    }

    #[test]
    fn counts_reset_when_the_day_rolls_over() {
        let policy = CalendarPolicy::with_utc_offset_minutes(0);
        let before_midnight = at(2024, 6, 15, 23, 59);
        let after_midnight = at(2024, 6, 16, 0, 1);
        assert_ne!(
            policy.day_window(before_midnight),
            policy.day_window(after_midnight)
        );
    }
}
