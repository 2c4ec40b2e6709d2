use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::employee::ROLE_EMPLOYEE;
use crate::models::{Leave, LeaveBalance};
use crate::response::{ApiResponse, Pagination};
use crate::rules::leave as rules;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub leave_type: Option<String>,
    pub employee_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct LeaveList {
    pub leaves: Vec<Leave>,
    pub pagination: Pagination,
}

pub async fn list(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<LeaveList>>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    // Non-managerial staff only ever see their own requests
    let employee_filter = if auth.role == ROLE_EMPLOYEE {
        Some(auth.employee_id)
    } else {
        query.employee_id
    };

    let leaves = db::leaves::list(
        &state.pool,
        employee_filter,
        query.status.as_deref(),
        query.leave_type.as_deref(),
        limit,
        offset,
    )
    .await?;
    let total = db::leaves::count(
        &state.pool,
        employee_filter,
        query.status.as_deref(),
        query.leave_type.as_deref(),
    )
    .await?;

    Ok(ApiResponse::ok(LeaveList {
        leaves,
        pagination: Pagination::new(page, limit, total),
    }))
}

pub async fn my(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let employee = db::employees::find_by_id(&state.pool, auth.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let leaves = db::leaves::list(&state.pool, Some(auth.employee_id), None, None, 100, 0).await?;

    let year = Utc::now().year();
    let used = db::leaves::used_days_by_type(&state.pool, auth.employee_id, year).await?;
    let used_for = |leave_type: &str| -> f64 {
        used.iter()
            .find(|(t, _)| t == leave_type)
            .map(|(_, days)| *days)
            .unwrap_or(0.0)
    };

    let balance = employee.leave_balance();
    let bucket = |remaining: f64, used: f64| {
        json!({ "total": remaining + used, "used": used, "remaining": remaining })
    };

    let pending = leaves.iter().filter(|l| l.status == rules::STATUS_PENDING).count();
    let approved = leaves
        .iter()
        .filter(|l| l.status == rules::STATUS_APPROVED)
        .count();

    Ok(ApiResponse::ok(json!({
        "leaves": leaves,
        "balances": {
            "annual": bucket(balance.annual, used_for("annual")),
            "sick": bucket(balance.sick, used_for("sick")),
            "casual": bucket(balance.casual, used_for("casual")),
            "maternity": bucket(balance.maternity, used_for("maternity")),
            "paternity": bucket(balance.paternity, used_for("paternity")),
        },
        "stats": { "pending": pending, "approved": approved },
    })))
}

#[derive(Deserialize)]
pub struct ApplyRequest {
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub half_day: Option<bool>,
    pub handover_notes: Option<String>,
}

pub async fn apply(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<ApiResponse<Leave>>, AppError> {
    if !rules::is_valid_leave_type(&req.leave_type) {
        return Err(AppError::BadRequest(format!(
            "Unknown leave type: {}",
            req.leave_type
        )));
    }
    if req.reason.trim().is_empty() {
        return Err(AppError::BadRequest("A reason is required".to_string()));
    }
    if req.start_date > req.end_date {
        return Err(AppError::BadRequest(
            "Start date must not be after end date".to_string(),
        ));
    }
    if req.start_date < Utc::now().date_naive() {
        return Err(AppError::BadRequest(
            "Leave cannot start in the past".to_string(),
        ));
    }

    let half_day = req.half_day.unwrap_or(false);
    let days = rules::working_days(req.start_date, req.end_date, half_day);
    if days <= 0.0 {
        return Err(AppError::BadRequest(
            "The requested range contains no working days".to_string(),
        ));
    }

    let overlapping =
        db::leaves::find_overlapping(&state.pool, auth.employee_id, req.start_date, req.end_date)
            .await?;
    if !overlapping.is_empty() {
        return Err(AppError::Conflict(
            "You already have a leave request overlapping these dates".to_string(),
        ));
    }

    let employee = db::employees::find_by_id(&state.pool, auth.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    let balance = employee.leave_balance();
    let remaining = match req.leave_type.as_str() {
        "annual" => balance.annual,
        "sick" => balance.sick,
        "casual" => balance.casual,
        "maternity" => balance.maternity,
        _ => balance.paternity,
    };
    if remaining < days {
        return Err(AppError::BadRequest(format!(
            "Insufficient {} leave balance: {days} requested, {remaining} available",
            req.leave_type
        )));
    }

    let leave = db::leaves::create(
        &state.pool,
        auth.employee_id,
        &req.leave_type,
        req.start_date,
        req.end_date,
        days,
        &req.reason,
        half_day,
        req.handover_notes.as_deref(),
    )
    .await?;

    Ok(ApiResponse::ok_with_message(leave, "Leave request submitted"))
}

pub async fn balance(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<LeaveBalance>>, AppError> {
    let employee = db::employees::find_by_id(&state.pool, auth.employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    Ok(ApiResponse::ok(employee.leave_balance()))
}

pub async fn get(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Leave>>, AppError> {
    let leave = db::leaves::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;
    auth.require_self_or_hr(leave.employee_id)?;
    Ok(ApiResponse::ok(leave))
}

#[derive(Deserialize, Default)]
pub struct ProcessRequest {
    pub hr_notes: Option<String>,
    pub rejection_reason: Option<String>,
}

pub async fn approve(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ApiResponse<Leave>>, AppError> {
    auth.require_hr_or_admin()?;

    let leave = db::leaves::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

    if !rules::can_process(&leave.status) {
        return Err(AppError::Conflict(format!(
            "Leave request is already {}",
            leave.status
        )));
    }

    // Status flip and balance deduction commit together; a concurrent
    // duplicate loses the conditional update and lands in NotPending.
    match db::leaves::approve(&state.pool, id, auth.employee_id, req.hr_notes.as_deref()).await? {
        db::leaves::ApproveOutcome::Approved(approved) => {
            Ok(ApiResponse::ok_with_message(approved, "Leave request approved"))
        }
        db::leaves::ApproveOutcome::NotPending => Err(AppError::Conflict(
            "Leave request has already been processed".to_string(),
        )),
        db::leaves::ApproveOutcome::InsufficientBalance => Err(AppError::Conflict(
            "Insufficient leave balance to approve this request".to_string(),
        )),
    }
}

pub async fn reject(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ApiResponse<Leave>>, AppError> {
    auth.require_hr_or_admin()?;

    let reason = req
        .rejection_reason
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("A rejection reason is required".to_string()))?;

    let leave = db::leaves::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

    if !rules::can_process(&leave.status) {
        return Err(AppError::Conflict(format!(
            "Leave request is already {}",
            leave.status
        )));
    }

    let rejected = db::leaves::reject(&state.pool, id, auth.employee_id, reason)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Leave request has already been processed".to_string())
        })?;
    Ok(ApiResponse::ok_with_message(rejected, "Leave request rejected"))
}

pub async fn cancel(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Leave>>, AppError> {
    let leave = db::leaves::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

    auth.require_self_or_hr(leave.employee_id)?;

    if !rules::can_cancel(&leave.status) {
        return Err(AppError::Conflict(format!(
            "A {} leave request cannot be cancelled",
            leave.status
        )));
    }

    // Balance restoration for approved requests happens inside the cancel
    // transaction; a concurrent duplicate gets None
    let cancelled = db::leaves::cancel(&state.pool, id).await?.ok_or_else(|| {
        AppError::Conflict("Leave request can no longer be cancelled".to_string())
    })?;
    Ok(ApiResponse::ok_with_message(cancelled, "Leave request cancelled"))
}
