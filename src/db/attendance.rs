use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Attendance;

/// One row per employee per day; a second check-in the same day fails with a
/// unique violation for the caller to map.
pub async fn check_in(
    pool: &PgPool,
    employee_id: Uuid,
    day: NaiveDate,
    at: DateTime<Utc>,
    location: &str,
    notes: Option<&str>,
    ip_address: Option<&str>,
    device_info: Option<&str>,
) -> Result<Attendance, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(
        "INSERT INTO attendance (employee_id, day, check_in, status, location, notes,
            ip_address, device_info)
         VALUES ($1, $2, $3, 'Present', $4, $5, $6, $7) RETURNING *",
    )
    .bind(employee_id)
    .bind(day)
    .bind(at)
    .bind(location)
    .bind(notes)
    .bind(ip_address)
    .bind(device_info)
    .fetch_one(pool)
    .await
}

pub async fn find_for_day(
    pool: &PgPool,
    employee_id: Uuid,
    day: NaiveDate,
) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE employee_id = $1 AND day = $2",
    )
    .bind(employee_id)
    .bind(day)
    .fetch_optional(pool)
    .await
}

/// Record the check-out with hours and status already derived by the caller.
pub async fn check_out(
    pool: &PgPool,
    id: Uuid,
    at: DateTime<Utc>,
    break_minutes: i32,
    total_hours: f64,
    status: &str,
) -> Result<Attendance, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(
        "UPDATE attendance SET check_out = $2, break_minutes = $3, total_hours = $4, status = $5
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(at)
    .bind(break_minutes)
    .bind(total_hours)
    .bind(status)
    .fetch_one(pool)
    .await
}

pub async fn list(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    day: Option<NaiveDate>,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance
         WHERE ($1::uuid IS NULL OR employee_id = $1)
           AND ($2::date IS NULL OR day = $2)
           AND ($3::text IS NULL OR status = $3)
         ORDER BY day DESC
         LIMIT $4 OFFSET $5",
    )
    .bind(employee_id)
    .bind(day)
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    day: Option<NaiveDate>,
    status: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM attendance
         WHERE ($1::uuid IS NULL OR employee_id = $1)
           AND ($2::date IS NULL OR day = $2)
           AND ($3::text IS NULL OR status = $3)",
    )
    .bind(employee_id)
    .bind(day)
    .bind(status)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Per-status day counts and worked hours over `[start, end]`:
/// (present, half days, late, absent, total hours).
pub async fn range_summary(
    pool: &PgPool,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(i64, i64, i64, i64, f64), sqlx::Error> {
    sqlx::query_as(
        "SELECT
            COUNT(*) FILTER (WHERE status = 'Present'),
            COUNT(*) FILTER (WHERE status = 'Half Day'),
            COUNT(*) FILTER (WHERE status = 'Late'),
            COUNT(*) FILTER (WHERE status = 'Absent'),
            COALESCE(SUM(total_hours), 0)
         FROM attendance
         WHERE employee_id = $1 AND day BETWEEN $2 AND $3",
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await
}

pub async fn day_status_counts(
    pool: &PgPool,
    day: NaiveDate,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as("SELECT status, COUNT(*) FROM attendance WHERE day = $1 GROUP BY status")
        .bind(day)
        .fetch_all(pool)
        .await
}

pub async fn count_for_day(pool: &PgPool, day: NaiveDate) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendance WHERE day = $1")
        .bind(day)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
