use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::payroll::NewPayroll;
use crate::error::AppError;
use crate::models::employee::ROLE_EMPLOYEE;
use crate::models::Payroll;
use crate::response::{ApiResponse, Pagination};
use crate::rules::leave::working_days;
use crate::rules::payroll::{attendance_adjusted_basic, compute_totals, Allowances, Deductions};
use crate::state::SharedState;

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

#[derive(Deserialize, Default)]
pub struct AllowancesInput {
    pub housing: Option<f64>,
    pub transport: Option<f64>,
    pub medical: Option<f64>,
    pub food: Option<f64>,
    pub overtime: Option<f64>,
    pub bonus: Option<f64>,
    pub other: Option<f64>,
}

impl AllowancesInput {
    fn resolve(&self) -> Allowances {
        Allowances {
            housing: self.housing.unwrap_or(0.0),
            transport: self.transport.unwrap_or(0.0),
            medical: self.medical.unwrap_or(0.0),
            food: self.food.unwrap_or(0.0),
            overtime: self.overtime.unwrap_or(0.0),
            bonus: self.bonus.unwrap_or(0.0),
            other: self.other.unwrap_or(0.0),
        }
    }

    fn apply(&self, base: &mut Allowances) {
        if let Some(v) = self.housing {
            base.housing = v;
        }
        if let Some(v) = self.transport {
            base.transport = v;
        }
        if let Some(v) = self.medical {
            base.medical = v;
        }
        if let Some(v) = self.food {
            base.food = v;
        }
        if let Some(v) = self.overtime {
            base.overtime = v;
        }
        if let Some(v) = self.bonus {
            base.bonus = v;
        }
        if let Some(v) = self.other {
            base.other = v;
        }
    }
}

#[derive(Deserialize, Default)]
pub struct DeductionsInput {
    pub tax: Option<f64>,
    pub social_security: Option<f64>,
    pub insurance: Option<f64>,
    pub provident_fund: Option<f64>,
    pub loan: Option<f64>,
    pub advance: Option<f64>,
    pub other: Option<f64>,
}

impl DeductionsInput {
    fn resolve(&self) -> Deductions {
        Deductions {
            tax: self.tax.unwrap_or(0.0),
            social_security: self.social_security.unwrap_or(0.0),
            insurance: self.insurance.unwrap_or(0.0),
            provident_fund: self.provident_fund.unwrap_or(0.0),
            loan: self.loan.unwrap_or(0.0),
            advance: self.advance.unwrap_or(0.0),
            other: self.other.unwrap_or(0.0),
        }
    }

    fn apply(&self, base: &mut Deductions) {
        if let Some(v) = self.tax {
            base.tax = v;
        }
        if let Some(v) = self.social_security {
            base.social_security = v;
        }
        if let Some(v) = self.insurance {
            base.insurance = v;
        }
        if let Some(v) = self.provident_fund {
            base.provident_fund = v;
        }
        if let Some(v) = self.loan {
            base.loan = v;
        }
        if let Some(v) = self.advance {
            base.advance = v;
        }
        if let Some(v) = self.other {
            base.other = v;
        }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub employee_id: Option<Uuid>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub payment_status: Option<String>,
}

#[derive(Serialize)]
pub struct PayrollList {
    pub payrolls: Vec<Payroll>,
    pub pagination: Pagination,
}

pub async fn list(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PayrollList>>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let employee_filter = if auth.role == ROLE_EMPLOYEE {
        Some(auth.employee_id)
    } else {
        query.employee_id
    };

    let payrolls = db::payroll::list(
        &state.pool,
        employee_filter,
        query.month,
        query.year,
        query.payment_status.as_deref(),
        limit,
        offset,
    )
    .await?;
    let total = db::payroll::count(
        &state.pool,
        employee_filter,
        query.month,
        query.year,
        query.payment_status.as_deref(),
    )
    .await?;

    Ok(ApiResponse::ok(PayrollList {
        payrolls,
        pagination: Pagination::new(page, limit, total),
    }))
}

pub async fn my(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let payrolls =
        db::payroll::list(&state.pool, Some(auth.employee_id), None, None, None, 24, 0).await?;

    let year = Utc::now().year();
    let (gross, net, deductions) =
        db::payroll::yearly_earnings(&state.pool, auth.employee_id, year).await?;

    Ok(ApiResponse::ok(json!({
        "payrolls": payrolls,
        "yearly_summary": {
            "year": year,
            "total_gross": gross,
            "total_net": net,
            "total_deductions": deductions,
        },
    })))
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub employee_id: Uuid,
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub allowances: AllowancesInput,
    #[serde(default)]
    pub deductions: DeductionsInput,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Build one employee's pay record for a period, pro-rated from that month's
/// attendance.
async fn build_payroll(
    state: &SharedState,
    employee_id: Uuid,
    month: u32,
    year: i32,
    allowances: Allowances,
    deductions: Deductions,
    payment_method: &str,
    notes: Option<&str>,
    generated_by: Uuid,
) -> Result<Payroll, AppError> {
    let employee = db::employees::find_by_id(&state.pool, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let (first, last) = month_bounds(year, month)
        .ok_or_else(|| AppError::BadRequest("Invalid month or year".to_string()))?;

    let total_working = working_days(first, last, false);
    let (present, half, late, absent, hours) =
        db::attendance::range_summary(&state.pool, employee_id, first, last).await?;

    // Late and half-day attendance still count as days on site; the half-day
    // penalty is applied separately inside the pro-rating.
    let present_days = (present + late + half) as f64;
    let half_days = half as f64;
    let absent_days = absent as f64;

    let adjusted_basic =
        attendance_adjusted_basic(employee.basic_salary, total_working, present_days, half_days);
    let totals = compute_totals(adjusted_basic, &allowances, &deductions, 0.0);

    let created = db::payroll::create(
        &state.pool,
        &NewPayroll {
            employee_id,
            month: month as i32,
            year,
            basic_salary: adjusted_basic,
            allowances,
            deductions,
            unpaid_leaves: absent_days,
            leave_deduction_amount: 0.0,
            working_days: total_working,
            present_days,
            absent_days,
            half_days,
            overtime_hours: (hours - present_days * 8.0).max(0.0),
            totals,
            payment_method,
            notes,
            generated_by,
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => AppError::Conflict(
            format!("Payroll for {month}/{year} already exists for this employee"),
        ),
        other => AppError::Database(other),
    })?;

    Ok(created)
}

pub async fn create(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<CreateRequest>,
) -> Result<Json<ApiResponse<Payroll>>, AppError> {
    auth.require_hr_or_admin()?;

    if !(1..=12).contains(&req.month) {
        return Err(AppError::BadRequest("Month must be 1-12".to_string()));
    }

    let created = build_payroll(
        &state,
        req.employee_id,
        req.month,
        req.year,
        req.allowances.resolve(),
        req.deductions.resolve(),
        req.payment_method.as_deref().unwrap_or("bank-transfer"),
        req.notes.as_deref(),
        auth.employee_id,
    )
    .await?;

    Ok(ApiResponse::ok_with_message(created, "Payroll record created"))
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub month: u32,
    pub year: i32,
}

/// Run payroll for every active employee. Periods that already exist are
/// skipped, so the operation can be retried safely.
pub async fn generate(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_hr_or_admin()?;

    if !(1..=12).contains(&req.month) {
        return Err(AppError::BadRequest("Month must be 1-12".to_string()));
    }

    let employees = db::employees::list_active(&state.pool).await?;
    let mut created = 0;
    let mut skipped = 0;

    for employee in &employees {
        match build_payroll(
            &state,
            employee.id,
            req.month,
            req.year,
            Allowances::default(),
            Deductions::default(),
            "bank-transfer",
            None,
            auth.employee_id,
        )
        .await
        {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => skipped += 1,
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Payroll generation for {}/{}: {created} created, {skipped} skipped",
        req.month,
        req.year
    );

    Ok(ApiResponse::ok(json!({
        "created": created,
        "skipped": skipped,
        "total_active": employees.len(),
    })))
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub async fn stats_summary(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_hr_or_admin()?;

    let now = Utc::now();
    let month = query.month.unwrap_or(now.month()) as i32;
    let year = query.year.unwrap_or(now.year());

    let (gross, net, deductions, count) =
        db::payroll::period_summary(&state.pool, month, year).await?;
    let by_status = db::payroll::count_by_status_for_period(&state.pool, month, year).await?;

    let statuses: serde_json::Map<String, serde_json::Value> = by_status
        .into_iter()
        .map(|(status, n)| (status, json!(n)))
        .collect();

    Ok(ApiResponse::ok(json!({
        "month": month,
        "year": year,
        "records": count,
        "total_gross": gross,
        "total_net": net,
        "total_deductions": deductions,
        "by_status": statuses,
    })))
}

pub async fn get(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Payroll>>, AppError> {
    let payroll = db::payroll::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payroll record not found".to_string()))?;
    auth.require_self_or_hr(payroll.employee_id)?;
    Ok(ApiResponse::ok(payroll))
}

#[derive(Deserialize, Default)]
pub struct UpdateRequest {
    pub basic_salary: Option<f64>,
    #[serde(default)]
    pub allowances: AllowancesInput,
    #[serde(default)]
    pub deductions: DeductionsInput,
    pub leave_deduction_amount: Option<f64>,
    pub unpaid_leaves: Option<f64>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

pub async fn update(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<ApiResponse<Payroll>>, AppError> {
    auth.require_hr_or_admin()?;

    let mut payroll = db::payroll::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payroll record not found".to_string()))?;

    if payroll.is_paid() {
        return Err(AppError::Conflict(
            "Paid payroll records cannot be modified".to_string(),
        ));
    }

    if let Some(v) = req.basic_salary {
        payroll.basic_salary = v;
    }
    let mut allowances = payroll.allowances();
    req.allowances.apply(&mut allowances);
    let mut deductions = payroll.deductions();
    req.deductions.apply(&mut deductions);
    if let Some(v) = req.leave_deduction_amount {
        payroll.leave_deduction_amount = v;
    }
    if let Some(v) = req.unpaid_leaves {
        payroll.unpaid_leaves = v;
    }
    if let Some(v) = req.payment_method {
        payroll.payment_method = v;
    }
    if let Some(v) = req.notes {
        payroll.notes = Some(v);
    }

    payroll.allowance_housing = allowances.housing;
    payroll.allowance_transport = allowances.transport;
    payroll.allowance_medical = allowances.medical;
    payroll.allowance_food = allowances.food;
    payroll.allowance_overtime = allowances.overtime;
    payroll.allowance_bonus = allowances.bonus;
    payroll.allowance_other = allowances.other;
    payroll.deduction_tax = deductions.tax;
    payroll.deduction_social_security = deductions.social_security;
    payroll.deduction_insurance = deductions.insurance;
    payroll.deduction_provident_fund = deductions.provident_fund;
    payroll.deduction_loan = deductions.loan;
    payroll.deduction_advance = deductions.advance;
    payroll.deduction_other = deductions.other;

    // Every save recomputes the derived totals so partial edits cannot leave
    // them stale
    let totals = compute_totals(
        payroll.basic_salary,
        &allowances,
        &deductions,
        payroll.leave_deduction_amount,
    );
    payroll.total_allowances = totals.total_allowances;
    payroll.total_deductions = totals.total_deductions;
    payroll.gross_salary = totals.gross_salary;
    payroll.net_salary = totals.net_salary;

    let updated = db::payroll::update(&state.pool, &payroll)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Paid payroll records cannot be modified".to_string())
        })?;
    Ok(ApiResponse::ok(updated))
}

pub async fn approve(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Payroll>>, AppError> {
    auth.require_hr_or_admin()?;

    let approved = db::payroll::approve(&state.pool, id, auth.employee_id)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Only pending payroll records can be approved".to_string())
        })?;
    Ok(ApiResponse::ok_with_message(approved, "Payroll approved"))
}

#[derive(Deserialize, Default)]
pub struct PayRequest {
    pub transaction_id: Option<String>,
}

pub async fn pay(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<PayRequest>,
) -> Result<Json<ApiResponse<Payroll>>, AppError> {
    auth.require_hr_or_admin()?;

    let paid = db::payroll::mark_paid(&state.pool, id, req.transaction_id.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Only processed payroll records can be paid".to_string())
        })?;
    Ok(ApiResponse::ok_with_message(paid, "Payroll marked as paid"))
}

/// Structured payslip document for the record's period.
pub async fn payslip(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let payroll = db::payroll::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payroll record not found".to_string()))?;
    auth.require_self_or_hr(payroll.employee_id)?;

    let employee = db::employees::find_by_id(&state.pool, payroll.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(ApiResponse::ok(json!({
        "employee": {
            "name": employee.full_name(),
            "employee_code": employee.employee_code,
            "department": employee.department,
            "designation": employee.designation,
        },
        "period": { "month": payroll.month, "year": payroll.year },
        "earnings": {
            "basic_salary": payroll.basic_salary,
            "housing": payroll.allowance_housing,
            "transport": payroll.allowance_transport,
            "medical": payroll.allowance_medical,
            "food": payroll.allowance_food,
            "overtime": payroll.allowance_overtime,
            "bonus": payroll.allowance_bonus,
            "other": payroll.allowance_other,
            "gross": payroll.gross_salary,
        },
        "deductions": {
            "tax": payroll.deduction_tax,
            "social_security": payroll.deduction_social_security,
            "insurance": payroll.deduction_insurance,
            "provident_fund": payroll.deduction_provident_fund,
            "loan": payroll.deduction_loan,
            "advance": payroll.deduction_advance,
            "other": payroll.deduction_other,
            "leave": payroll.leave_deduction_amount,
            "total": payroll.total_deductions,
        },
        "attendance": {
            "working_days": payroll.working_days,
            "present_days": payroll.present_days,
            "absent_days": payroll.absent_days,
            "half_days": payroll.half_days,
        },
        "net_salary": payroll.net_salary,
        "payment": {
            "status": payroll.payment_status,
            "method": payroll.payment_method,
            "date": payroll.payment_date,
            "transaction_id": payroll.transaction_id,
        },
        "currency": employee.currency,
    })))
}
