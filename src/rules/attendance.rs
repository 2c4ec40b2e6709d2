use chrono::{DateTime, Utc};

pub const STATUS_PRESENT: &str = "Present";
pub const STATUS_ABSENT: &str = "Absent";
pub const STATUS_LATE: &str = "Late";
pub const STATUS_HALF_DAY: &str = "Half Day";

/// Hours between check-in and check-out minus break time, floored at zero
/// and rounded to two decimals.
pub fn total_hours(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    break_minutes: i32,
) -> f64 {
    let worked = (check_out - check_in).num_seconds() as f64 / 3600.0;
    let hours = worked - f64::from(break_minutes) / 60.0;
    (hours.max(0.0) * 100.0).round() / 100.0
}

/// Classify a day from its timestamps. Runs at the persistence boundary and
/// overrides any caller-supplied status once both timestamps exist.
pub fn derive_status(
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
    break_minutes: i32,
) -> (f64, &'static str) {
    match (check_in, check_out) {
        (Some(inn), Some(out)) => {
            let hours = total_hours(inn, out, break_minutes);
            let status = if hours >= 8.0 {
                STATUS_PRESENT
            } else if hours >= 4.0 {
                STATUS_HALF_DAY
            } else {
                STATUS_LATE
            };
            (hours, status)
        }
        // Checked in, still working.
        (Some(_), None) => (0.0, STATUS_PRESENT),
        _ => (0.0, STATUS_ABSENT),
    }
}
