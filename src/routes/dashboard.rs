use axum::extract::State;
use axum::Json;
use chrono::{Datelike, Utc};
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::SharedState;

/// One aggregate endpoint per role: employees get their own snapshot, HR and
/// admins get the organization-wide one.
pub async fn get(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if auth.is_hr_or_admin() {
        organization_dashboard(&state).await
    } else {
        employee_dashboard(&state, &auth).await
    }
}

async fn employee_dashboard(
    state: &SharedState,
    auth: &AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let employee = db::employees::find_by_id(&state.pool, auth.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let today = Utc::now().date_naive();
    let first = today.with_day(1).unwrap_or(today);
    let (present, half, late, absent, hours) =
        db::attendance::range_summary(&state.pool, auth.employee_id, first, today).await?;

    let pending_leaves = db::leaves::count(
        &state.pool,
        Some(auth.employee_id),
        Some("pending"),
        None,
    )
    .await?;

    let latest_payslip =
        db::payroll::list(&state.pool, Some(auth.employee_id), None, None, None, 1, 0)
            .await?
            .into_iter()
            .next();

    Ok(ApiResponse::ok(json!({
        "role": auth.role,
        "leave_balance": employee.leave_balance(),
        "pending_leaves": pending_leaves,
        "attendance_this_month": {
            "present": present,
            "half_days": half,
            "late": late,
            "absent": absent,
            "total_hours": hours,
        },
        "latest_payslip": latest_payslip,
    })))
}

async fn organization_dashboard(
    state: &SharedState,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let now = Utc::now();
    let today = now.date_naive();

    let total = db::employees::count_all(&state.pool).await?;
    let active = db::employees::count_by_status(&state.pool, "active").await?;
    let by_department = db::employees::headcount_by_department(&state.pool).await?;
    let pending_leaves = db::leaves::count_pending(&state.pool).await?;
    let today_counts = db::attendance::day_status_counts(&state.pool, today).await?;
    let (gross, net, deductions, payroll_records) =
        db::payroll::period_summary(&state.pool, now.month() as i32, now.year()).await?;
    let recent_leaves = db::leaves::list(&state.pool, None, None, None, 5, 0).await?;

    let departments: Vec<serde_json::Value> = by_department
        .into_iter()
        .map(|(department, count)| json!({ "department": department, "count": count }))
        .collect();
    let attendance_today: serde_json::Map<String, serde_json::Value> = today_counts
        .into_iter()
        .map(|(status, n)| (status, json!(n)))
        .collect();

    Ok(ApiResponse::ok(json!({
        "employees": {
            "total": total,
            "active": active,
            "departments": departments,
        },
        "pending_leaves": pending_leaves,
        "attendance_today": attendance_today,
        "payroll_this_month": {
            "records": payroll_records,
            "total_gross": gross,
            "total_net": net,
            "total_deductions": deductions,
        },
        "recent_leaves": recent_leaves,
    })))
}
