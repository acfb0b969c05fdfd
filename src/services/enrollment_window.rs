//! Time-window policy deciding whether a session accepts enrollments.

use time::{Date, Duration, PrimitiveDateTime, Time};

/// How long before the session day enrollment opens.
pub const ENROLLMENT_LEAD: Duration = Duration::days(3);

/// First instant (league wall-clock) at which enrollment is accepted.
pub fn opens_at(session_date: Date) -> PrimitiveDateTime {
    PrimitiveDateTime::new(session_date, Time::MIDNIGHT) - ENROLLMENT_LEAD
}

/// First instant at which enrollment is closed again, the midnight ending the session day.
pub fn closes_at(session_date: Date) -> PrimitiveDateTime {
    PrimitiveDateTime::new(session_date, Time::MIDNIGHT) + Duration::days(1)
}

/// Whether enrollment is open for a session dated `session_date` at `now`.
///
/// Both timestamps are league-local wall-clock times. The opening boundary is inclusive.
pub fn can_enroll(session_date: Date, now: PrimitiveDateTime) -> bool {
    now >= opens_at(session_date) && now < closes_at(session_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn opens_exactly_three_days_before_at_midnight() {
        assert!(can_enroll(date!(2025 - 07 - 10), datetime!(2025-07-07 00:00:00)));
    }

    #[test]
    fn closed_one_second_before_the_threshold() {
        assert!(!can_enroll(date!(2025 - 07 - 10), datetime!(2025-07-06 23:59:59)));
    }

    #[test]
    fn open_on_the_session_day_itself() {
        assert!(can_enroll(date!(2025 - 07 - 10), datetime!(2025-07-10 21:30:00)));
    }

    #[test]
    fn closed_once_the_session_day_is_over() {
        assert!(!can_enroll(date!(2025 - 07 - 10), datetime!(2025-07-11 00:00:00)));
    }

    #[test]
    fn closed_far_ahead_of_the_session() {
        assert!(!can_enroll(date!(2025 - 07 - 10), datetime!(2025-07-01 12:00:00)));
    }

    #[test]
    fn threshold_crosses_month_boundaries() {
        assert_eq!(opens_at(date!(2025 - 08 - 02)), datetime!(2025-07-30 00:00:00));
    }
}
