use chrono::{Datelike, NaiveDate, Weekday};

pub const LEAVE_TYPES: &[&str] = &["annual", "sick", "casual", "maternity", "paternity"];

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_CANCELLED: &str = "cancelled";

pub fn is_valid_leave_type(leave_type: &str) -> bool {
    LEAVE_TYPES.contains(&leave_type)
}

/// Count working days in `[start, end]` inclusive, skipping Saturdays and
/// Sundays. A half-day request halves the count.
pub fn working_days(start: NaiveDate, end: NaiveDate, half_day: bool) -> f64 {
    let mut days = 0.0;
    let mut current = start;
    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days += 1.0;
        }
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    if half_day { days / 2.0 } else { days }
}

/// Two date ranges overlap when `a.start <= b.end && a.end >= b.start`.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Statuses that block a new request for the same employee over an
/// overlapping range.
pub fn blocks_new_requests(status: &str) -> bool {
    status == STATUS_PENDING || status == STATUS_APPROVED
}

/// Only pending requests can be approved or rejected.
pub fn can_process(status: &str) -> bool {
    status == STATUS_PENDING
}

/// Pending and approved requests can be cancelled; rejected and cancelled
/// are terminal.
pub fn can_cancel(status: &str) -> bool {
    status == STATUS_PENDING || status == STATUS_APPROVED
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monday_to_friday_counts_every_day() {
        // 2025-06-02 is a Monday.
        assert_eq!(working_days(date(2025, 6, 2), date(2025, 6, 6), false), 5.0);
    }

    #[test]
    fn weekend_only_range_counts_zero() {
        // 2025-06-07 is a Saturday.
        assert_eq!(working_days(date(2025, 6, 7), date(2025, 6, 8), false), 0.0);
    }

    #[test]
    fn span_across_weekend_skips_it() {
        // Friday through Monday: only Friday and Monday count.
        assert_eq!(working_days(date(2025, 6, 6), date(2025, 6, 9), false), 2.0);
    }

    #[test]
    fn half_day_halves_the_count() {
        assert_eq!(working_days(date(2025, 6, 2), date(2025, 6, 2), true), 0.5);
    }

    #[test]
    fn single_day_overlaps_itself() {
        let d = date(2025, 6, 2);
        assert!(ranges_overlap(d, d, d, d));
    }

    #[test]
    fn touching_endpoints_overlap() {
        assert!(ranges_overlap(
            date(2025, 6, 2),
            date(2025, 6, 5),
            date(2025, 6, 5),
            date(2025, 6, 10),
        ));
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        assert!(!ranges_overlap(
            date(2025, 6, 2),
            date(2025, 6, 4),
            date(2025, 6, 5),
            date(2025, 6, 10),
        ));
    }

    #[test]
    fn state_machine_guards() {
        assert!(can_process(STATUS_PENDING));
        assert!(!can_process(STATUS_APPROVED));
        assert!(!can_process(STATUS_REJECTED));

        assert!(can_cancel(STATUS_PENDING));
        assert!(can_cancel(STATUS_APPROVED));
        assert!(!can_cancel(STATUS_REJECTED));
        assert!(!can_cancel(STATUS_CANCELLED));

        assert!(blocks_new_requests(STATUS_PENDING));
        assert!(blocks_new_requests(STATUS_APPROVED));
        assert!(!blocks_new_requests(STATUS_CANCELLED));
    }
}
