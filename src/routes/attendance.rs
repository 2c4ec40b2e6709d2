use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Attendance;
use crate::response::{ApiResponse, Pagination};
use crate::rules::attendance as rules;
use crate::state::SharedState;

fn current_month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = today.with_day(1).unwrap_or(today);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(today);
    (first, last)
}

#[derive(Deserialize, Default)]
pub struct CheckInRequest {
    pub location: Option<String>,
    pub notes: Option<String>,
}

pub async fn check_in(
    State(state): State<SharedState>,
    auth: AuthUser,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<ApiResponse<Attendance>>, AppError> {
    let now = Utc::now();
    let device_info = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let record = db::attendance::check_in(
        &state.pool,
        auth.employee_id,
        now.date_naive(),
        now,
        req.location.as_deref().unwrap_or("Office"),
        req.notes.as_deref(),
        Some(&addr.ip().to_string()),
        device_info.as_deref(),
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Already checked in today".to_string())
        }
        other => AppError::Database(other),
    })?;

    Ok(ApiResponse::ok_with_message(record, "Checked in"))
}

#[derive(Deserialize, Default)]
pub struct CheckOutRequest {
    pub break_minutes: Option<i32>,
}

pub async fn check_out(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<CheckOutRequest>,
) -> Result<Json<ApiResponse<Attendance>>, AppError> {
    let now = Utc::now();
    let record = db::attendance::find_for_day(&state.pool, auth.employee_id, now.date_naive())
        .await?
        .ok_or_else(|| AppError::BadRequest("You have not checked in today".to_string()))?;

    let Some(check_in_at) = record.check_in else {
        return Err(AppError::BadRequest(
            "You have not checked in today".to_string(),
        ));
    };
    if record.check_out.is_some() {
        return Err(AppError::Conflict("Already checked out today".to_string()));
    }

    let break_minutes = req.break_minutes.unwrap_or(record.break_minutes).max(0);
    let (hours, status) = rules::derive_status(Some(check_in_at), Some(now), break_minutes);

    let updated =
        db::attendance::check_out(&state.pool, record.id, now, break_minutes, hours, status)
            .await?;

    Ok(ApiResponse::ok_with_message(updated, "Checked out"))
}

#[derive(Deserialize)]
pub struct MyQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct AttendanceList {
    pub records: Vec<Attendance>,
    pub pagination: Pagination,
    pub stats: serde_json::Value,
}

pub async fn my(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<MyQuery>,
) -> Result<Json<ApiResponse<AttendanceList>>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(31).clamp(1, 100);
    let offset = (page - 1) * limit;

    let records = db::attendance::list(
        &state.pool,
        Some(auth.employee_id),
        None,
        None,
        limit,
        offset,
    )
    .await?;
    let total = db::attendance::count(&state.pool, Some(auth.employee_id), None, None).await?;

    let (first, last) = current_month_bounds(Utc::now().date_naive());
    let (present, half, late, absent, hours) =
        db::attendance::range_summary(&state.pool, auth.employee_id, first, last).await?;

    Ok(ApiResponse::ok(AttendanceList {
        records,
        pagination: Pagination::new(page, limit, total),
        stats: json!({
            "present": present,
            "half_days": half,
            "late": late,
            "absent": absent,
            "total_hours": hours,
        }),
    }))
}

pub async fn today(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let record =
        db::attendance::find_for_day(&state.pool, auth.employee_id, Utc::now().date_naive())
            .await?;

    let can_check_in = record.is_none();
    let can_check_out = record
        .as_ref()
        .is_some_and(|r| r.check_in.is_some() && r.check_out.is_none());

    Ok(ApiResponse::ok(json!({
        "record": record,
        "can_check_in": can_check_in,
        "can_check_out": can_check_out,
    })))
}

pub async fn summary(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let today = Utc::now().date_naive();
    let (first, last) = current_month_bounds(today);
    let (present, half, late, absent, hours) =
        db::attendance::range_summary(&state.pool, auth.employee_id, first, last).await?;

    Ok(ApiResponse::ok(json!({
        "month": today.month(),
        "year": today.year(),
        "present": present,
        "half_days": half,
        "late": late,
        "absent": absent,
        "total_hours": hours,
    })))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub employee_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = (page - 1) * limit;

    let records = db::attendance::list(
        &state.pool,
        query.employee_id,
        query.date,
        query.status.as_deref(),
        limit,
        offset,
    )
    .await?;
    let total = db::attendance::count(
        &state.pool,
        query.employee_id,
        query.date,
        query.status.as_deref(),
    )
    .await?;

    Ok(ApiResponse::ok(json!({
        "records": records,
        "pagination": Pagination::new(page, limit, total),
    })))
}

pub async fn stats(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_hr_or_admin()?;

    let today = Utc::now().date_naive();
    let counts = db::attendance::day_status_counts(&state.pool, today).await?;
    let active = db::employees::count_by_status(&state.pool, "active").await?;

    let count_for = |status: &str| -> i64 {
        counts
            .iter()
            .find(|(s, _)| s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };

    let checked_in = counts.iter().map(|(_, n)| n).sum::<i64>();

    Ok(ApiResponse::ok(json!({
        "date": today,
        "active_employees": active,
        "checked_in": checked_in,
        "present": count_for(rules::STATUS_PRESENT),
        "half_day": count_for(rules::STATUS_HALF_DAY),
        "late": count_for(rules::STATUS_LATE),
        "not_checked_in": (active - checked_in).max(0),
    })))
}

/// HR view of one employee's month.
#[derive(Deserialize)]
pub struct EmployeeMonthQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub async fn employee_month(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<EmployeeMonthQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_self_or_hr(employee_id)?;

    let now = Utc::now();
    let month = query.month.unwrap_or(now.month());
    let year = query.year.unwrap_or(now.year());
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest("Invalid month or year".to_string()))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::BadRequest("Invalid month or year".to_string()))?;

    let (present, half, late, absent, hours) =
        db::attendance::range_summary(&state.pool, employee_id, first, last).await?;

    Ok(ApiResponse::ok(json!({
        "employee_id": employee_id,
        "month": month,
        "year": year,
        "present": present,
        "half_days": half,
        "late": late,
        "absent": absent,
        "total_hours": hours,
    })))
}
