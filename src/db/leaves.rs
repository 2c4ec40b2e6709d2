use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Leave;
use crate::rules::leave::STATUS_APPROVED;

/// Result of an approval attempt. The status flip is conditional on the row
/// still being pending, so only one of several concurrent approvals wins.
pub enum ApproveOutcome {
    Approved(Leave),
    NotPending,
    InsufficientBalance,
}

pub async fn create(
    pool: &PgPool,
    employee_id: Uuid,
    leave_type: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    number_of_days: f64,
    reason: &str,
    half_day: bool,
    handover_notes: Option<&str>,
) -> Result<Leave, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "INSERT INTO leaves (employee_id, leave_type, start_date, end_date, number_of_days,
            reason, half_day, handover_notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(employee_id)
    .bind(leave_type)
    .bind(start_date)
    .bind(end_date)
    .bind(number_of_days)
    .bind(reason)
    .bind(half_day)
    .bind(handover_notes)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>("SELECT * FROM leaves WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    status: Option<&str>,
    leave_type: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "SELECT * FROM leaves
         WHERE ($1::uuid IS NULL OR employee_id = $1)
           AND ($2::text IS NULL OR status = $2)
           AND ($3::text IS NULL OR leave_type = $3)
         ORDER BY applied_at DESC
         LIMIT $4 OFFSET $5",
    )
    .bind(employee_id)
    .bind(status)
    .bind(leave_type)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    status: Option<&str>,
    leave_type: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM leaves
         WHERE ($1::uuid IS NULL OR employee_id = $1)
           AND ($2::text IS NULL OR status = $2)
           AND ($3::text IS NULL OR leave_type = $3)",
    )
    .bind(employee_id)
    .bind(status)
    .bind(leave_type)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Pending or approved requests whose range touches `[start, end]`.
pub async fn find_overlapping(
    pool: &PgPool,
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "SELECT * FROM leaves
         WHERE employee_id = $1
           AND status IN ('pending', 'approved')
           AND start_date <= $3 AND end_date >= $2",
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

/// Approve a pending request and deduct the balance in one transaction.
/// The status update carries `AND status = 'pending'`, so the first approval
/// claims the row and any concurrent duplicate sees `NotPending`. The balance
/// deduction keeps its own rows-affected guard; when it fails the status flip
/// rolls back with it.
pub async fn approve(
    pool: &PgPool,
    id: Uuid,
    approver: Uuid,
    hr_notes: Option<&str>,
) -> Result<ApproveOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, Leave>(
        "UPDATE leaves SET status = 'approved', approved_by = $2, approved_at = now(),
            hr_notes = $3
         WHERE id = $1 AND status = 'pending' RETURNING *",
    )
    .bind(id)
    .bind(approver)
    .bind(hr_notes)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(updated) = updated else {
        return Ok(ApproveOutcome::NotPending);
    };

    let deducted = super::employees::deduct_balance(
        &mut *tx,
        updated.employee_id,
        &updated.leave_type,
        updated.number_of_days,
    )
    .await?;
    if !deducted {
        tx.rollback().await?;
        return Ok(ApproveOutcome::InsufficientBalance);
    }

    tx.commit().await?;
    Ok(ApproveOutcome::Approved(updated))
}

/// Reject a request that is still pending. Returns None when another
/// processor got there first.
pub async fn reject(
    pool: &PgPool,
    id: Uuid,
    approver: Uuid,
    rejection_reason: &str,
) -> Result<Option<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "UPDATE leaves SET status = 'rejected', approved_by = $2, approved_at = now(),
            rejection_reason = $3
         WHERE id = $1 AND status = 'pending' RETURNING *",
    )
    .bind(id)
    .bind(approver)
    .bind(rejection_reason)
    .fetch_optional(pool)
    .await
}

/// Cancel a pending or approved request, giving deducted days back when it
/// was approved. The row lock pins the status read, so two concurrent
/// cancellations cannot both restore the balance. Returns None when the
/// request is no longer cancellable.
pub async fn cancel(pool: &PgPool, id: Uuid) -> Result<Option<Leave>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let prior: Option<(String,)> = sqlx::query_as(
        "SELECT status FROM leaves
         WHERE id = $1 AND status IN ('pending', 'approved') FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((prior,)) = prior else {
        return Ok(None);
    };

    let cancelled = sqlx::query_as::<_, Leave>(
        "UPDATE leaves SET status = 'cancelled' WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if prior == STATUS_APPROVED {
        super::employees::restore_balance(
            &mut *tx,
            cancelled.employee_id,
            &cancelled.leave_type,
            cancelled.number_of_days,
        )
        .await?;
    }

    tx.commit().await?;
    Ok(Some(cancelled))
}

pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leaves WHERE status = 'pending'")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Approved days taken per leave type in a calendar year.
pub async fn used_days_by_type(
    pool: &PgPool,
    employee_id: Uuid,
    year: i32,
) -> Result<Vec<(String, f64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT leave_type, COALESCE(SUM(number_of_days), 0)
         FROM leaves
         WHERE employee_id = $1 AND status = 'approved'
           AND EXTRACT(YEAR FROM start_date) = $2
         GROUP BY leave_type",
    )
    .bind(employee_id)
    .bind(f64::from(year))
    .fetch_all(pool)
    .await
}

/// Pending and approved leaves overlapping `[start, end]`, optionally limited
/// to one department. Feeds the calendar views.
pub async fn list_for_range(
    pool: &PgPool,
    start: NaiveDate,
    end: NaiveDate,
    department: Option<&str>,
) -> Result<Vec<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "SELECT l.* FROM leaves l
         JOIN employees e ON e.id = l.employee_id
         WHERE l.status IN ('pending', 'approved')
           AND l.start_date <= $2 AND l.end_date >= $1
           AND ($3::text IS NULL OR e.department = $3)
         ORDER BY l.start_date",
    )
    .bind(start)
    .bind(end)
    .bind(department)
    .fetch_all(pool)
    .await
}

pub async fn exists_for_employee(pool: &PgPool, employee_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM leaves WHERE employee_id = $1)")
        .bind(employee_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
