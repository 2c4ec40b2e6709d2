use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payroll::{PAYMENT_PAID, PAYMENT_PENDING, PAYMENT_PROCESSED};
use crate::models::Payroll;
use crate::rules::payroll::{Allowances, Deductions, Totals};

/// Insert parameters for one employee's pay period. Totals come precomputed
/// from `rules::payroll::compute_totals`.
pub struct NewPayroll<'a> {
    pub employee_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub basic_salary: f64,
    pub allowances: Allowances,
    pub deductions: Deductions,
    pub unpaid_leaves: f64,
    pub leave_deduction_amount: f64,
    pub working_days: f64,
    pub present_days: f64,
    pub absent_days: f64,
    pub half_days: f64,
    pub overtime_hours: f64,
    pub totals: Totals,
    pub payment_method: &'a str,
    pub notes: Option<&'a str>,
    pub generated_by: Uuid,
}

/// One row per (employee, month, year); a second insert for the same period
/// fails with a unique violation for the caller to map.
pub async fn create(pool: &PgPool, new: &NewPayroll<'_>) -> Result<Payroll, sqlx::Error> {
    sqlx::query_as::<_, Payroll>(
        "INSERT INTO payroll (employee_id, month, year, basic_salary,
            allowance_housing, allowance_transport, allowance_medical, allowance_food,
            allowance_overtime, allowance_bonus, allowance_other,
            deduction_tax, deduction_social_security, deduction_insurance,
            deduction_provident_fund, deduction_loan, deduction_advance, deduction_other,
            unpaid_leaves, leave_deduction_amount,
            working_days, present_days, absent_days, half_days, overtime_hours,
            gross_salary, total_allowances, total_deductions, net_salary,
            payment_method, notes, generated_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
            $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32)
         RETURNING *",
    )
    .bind(new.employee_id)
    .bind(new.month)
    .bind(new.year)
    .bind(new.basic_salary)
    .bind(new.allowances.housing)
    .bind(new.allowances.transport)
    .bind(new.allowances.medical)
    .bind(new.allowances.food)
    .bind(new.allowances.overtime)
    .bind(new.allowances.bonus)
    .bind(new.allowances.other)
    .bind(new.deductions.tax)
    .bind(new.deductions.social_security)
    .bind(new.deductions.insurance)
    .bind(new.deductions.provident_fund)
    .bind(new.deductions.loan)
    .bind(new.deductions.advance)
    .bind(new.deductions.other)
    .bind(new.unpaid_leaves)
    .bind(new.leave_deduction_amount)
    .bind(new.working_days)
    .bind(new.present_days)
    .bind(new.absent_days)
    .bind(new.half_days)
    .bind(new.overtime_hours)
    .bind(new.totals.gross_salary)
    .bind(new.totals.total_allowances)
    .bind(new.totals.total_deductions)
    .bind(new.totals.net_salary)
    .bind(new.payment_method)
    .bind(new.notes)
    .bind(new.generated_by)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Payroll>, sqlx::Error> {
    sqlx::query_as::<_, Payroll>("SELECT * FROM payroll WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    month: Option<i32>,
    year: Option<i32>,
    payment_status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Payroll>, sqlx::Error> {
    sqlx::query_as::<_, Payroll>(
        "SELECT * FROM payroll
         WHERE ($1::uuid IS NULL OR employee_id = $1)
           AND ($2::int IS NULL OR month = $2)
           AND ($3::int IS NULL OR year = $3)
           AND ($4::text IS NULL OR payment_status = $4)
         ORDER BY year DESC, month DESC
         LIMIT $5 OFFSET $6",
    )
    .bind(employee_id)
    .bind(month)
    .bind(year)
    .bind(payment_status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    month: Option<i32>,
    year: Option<i32>,
    payment_status: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM payroll
         WHERE ($1::uuid IS NULL OR employee_id = $1)
           AND ($2::int IS NULL OR month = $2)
           AND ($3::int IS NULL OR year = $3)
           AND ($4::text IS NULL OR payment_status = $4)",
    )
    .bind(employee_id)
    .bind(month)
    .bind(year)
    .bind(payment_status)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Rewrite the editable pay fields from an already-modified row. Totals must
/// have been recomputed by the caller before this runs. The paid guard lives
/// in the WHERE clause; None means the record was paid in the meantime.
pub async fn update(pool: &PgPool, payroll: &Payroll) -> Result<Option<Payroll>, sqlx::Error> {
    sqlx::query_as::<_, Payroll>(
        "UPDATE payroll SET
            basic_salary = $2,
            allowance_housing = $3, allowance_transport = $4, allowance_medical = $5,
            allowance_food = $6, allowance_overtime = $7, allowance_bonus = $8,
            allowance_other = $9,
            deduction_tax = $10, deduction_social_security = $11, deduction_insurance = $12,
            deduction_provident_fund = $13, deduction_loan = $14, deduction_advance = $15,
            deduction_other = $16,
            unpaid_leaves = $17, leave_deduction_amount = $18,
            gross_salary = $19, total_allowances = $20, total_deductions = $21,
            net_salary = $22,
            payment_method = $23, notes = $24
         WHERE id = $1 AND payment_status <> $25 RETURNING *",
    )
    .bind(payroll.id)
    .bind(payroll.basic_salary)
    .bind(payroll.allowance_housing)
    .bind(payroll.allowance_transport)
    .bind(payroll.allowance_medical)
    .bind(payroll.allowance_food)
    .bind(payroll.allowance_overtime)
    .bind(payroll.allowance_bonus)
    .bind(payroll.allowance_other)
    .bind(payroll.deduction_tax)
    .bind(payroll.deduction_social_security)
    .bind(payroll.deduction_insurance)
    .bind(payroll.deduction_provident_fund)
    .bind(payroll.deduction_loan)
    .bind(payroll.deduction_advance)
    .bind(payroll.deduction_other)
    .bind(payroll.unpaid_leaves)
    .bind(payroll.leave_deduction_amount)
    .bind(payroll.gross_salary)
    .bind(payroll.total_allowances)
    .bind(payroll.total_deductions)
    .bind(payroll.net_salary)
    .bind(&payroll.payment_method)
    .bind(&payroll.notes)
    .bind(PAYMENT_PAID)
    .fetch_optional(pool)
    .await
}

/// pending -> processed. Returns None when the row was not pending.
pub async fn approve(
    pool: &PgPool,
    id: Uuid,
    approver: Uuid,
) -> Result<Option<Payroll>, sqlx::Error> {
    sqlx::query_as::<_, Payroll>(
        "UPDATE payroll SET payment_status = $3, approved_by = $2, approved_at = now()
         WHERE id = $1 AND payment_status = $4 RETURNING *",
    )
    .bind(id)
    .bind(approver)
    .bind(PAYMENT_PROCESSED)
    .bind(PAYMENT_PENDING)
    .fetch_optional(pool)
    .await
}

/// processed -> paid. Returns None when the row was not processed.
pub async fn mark_paid(
    pool: &PgPool,
    id: Uuid,
    transaction_id: Option<&str>,
) -> Result<Option<Payroll>, sqlx::Error> {
    sqlx::query_as::<_, Payroll>(
        "UPDATE payroll SET payment_status = $3, payment_date = now(), transaction_id = $2
         WHERE id = $1 AND payment_status = $4 RETURNING *",
    )
    .bind(id)
    .bind(transaction_id)
    .bind(PAYMENT_PAID)
    .bind(PAYMENT_PROCESSED)
    .fetch_optional(pool)
    .await
}

/// (total gross, total net, total deductions, record count) for a period.
pub async fn period_summary(
    pool: &PgPool,
    month: i32,
    year: i32,
) -> Result<(f64, f64, f64, i64), sqlx::Error> {
    sqlx::query_as(
        "SELECT COALESCE(SUM(gross_salary), 0), COALESCE(SUM(net_salary), 0),
                COALESCE(SUM(total_deductions), 0), COUNT(*)
         FROM payroll WHERE month = $1 AND year = $2",
    )
    .bind(month)
    .bind(year)
    .fetch_one(pool)
    .await
}

pub async fn count_by_status_for_period(
    pool: &PgPool,
    month: i32,
    year: i32,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT payment_status, COUNT(*) FROM payroll
         WHERE month = $1 AND year = $2 GROUP BY payment_status",
    )
    .bind(month)
    .bind(year)
    .fetch_all(pool)
    .await
}

/// (total gross, total net, total deductions) across one employee's year.
pub async fn yearly_earnings(
    pool: &PgPool,
    employee_id: Uuid,
    year: i32,
) -> Result<(f64, f64, f64), sqlx::Error> {
    sqlx::query_as(
        "SELECT COALESCE(SUM(gross_salary), 0), COALESCE(SUM(net_salary), 0),
                COALESCE(SUM(total_deductions), 0)
         FROM payroll WHERE employee_id = $1 AND year = $2",
    )
    .bind(employee_id)
    .bind(year)
    .fetch_one(pool)
    .await
}

pub async fn exists_for_employee(pool: &PgPool, employee_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM payroll WHERE employee_id = $1)")
            .bind(employee_id)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}
