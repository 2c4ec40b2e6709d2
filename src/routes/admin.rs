use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::employee::{self, EmployeeView, ROLES, STATUSES};
use crate::response::{ApiResponse, Pagination};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

pub async fn list_users(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = (page - 1) * limit;

    let rows = db::employees::list(
        &state.pool,
        None,
        query.status.as_deref(),
        query.search.as_deref(),
        limit,
        offset,
    )
    .await?;
    let total = db::employees::count(
        &state.pool,
        None,
        query.status.as_deref(),
        query.search.as_deref(),
    )
    .await?;

    let users: Vec<EmployeeView> = rows
        .iter()
        .map(|e| employee::project(e, auth.employee_id, &auth.role))
        .collect();

    Ok(ApiResponse::ok(json!({
        "users": users,
        "pagination": Pagination::new(page, limit, total),
    })))
}

#[derive(Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

pub async fn change_role(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    if !ROLES.contains(&req.role.as_str()) {
        return Err(AppError::BadRequest(format!("Unknown role: {}", req.role)));
    }
    if auth.employee_id == id {
        return Err(AppError::BadRequest(
            "You cannot change your own role".to_string(),
        ));
    }

    db::employees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    db::employees::update_role(&state.pool, id, &req.role).await?;
    Ok(ApiResponse::message("Role updated"))
}

#[derive(Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
}

pub async fn change_status(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    if !STATUSES.contains(&req.status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown status: {}",
            req.status
        )));
    }
    if auth.employee_id == id {
        return Err(AppError::BadRequest(
            "You cannot change your own status".to_string(),
        ));
    }

    db::employees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    db::employees::update_status(&state.pool, id, &req.status).await?;
    Ok(ApiResponse::message("Status updated"))
}

/// Hard delete. Refused while leave or payroll history references the
/// account; deactivate instead.
pub async fn delete_user(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    if auth.employee_id == id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    db::employees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let has_leaves = db::leaves::exists_for_employee(&state.pool, id).await?;
    let has_payroll = db::payroll::exists_for_employee(&state.pool, id).await?;
    if has_leaves || has_payroll {
        return Err(AppError::Conflict(
            "Employee has leave or payroll history; deactivate the account instead".to_string(),
        ));
    }

    db::employees::delete(&state.pool, id).await?;
    Ok(ApiResponse::message("Employee deleted"))
}

pub async fn analytics(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    let total = db::employees::count_all(&state.pool).await?;
    let active = db::employees::count_by_status(&state.pool, "active").await?;
    let terminated = db::employees::count_by_status(&state.pool, "terminated").await?;
    let suspended = db::employees::count_by_status(&state.pool, "suspended").await?;
    let by_department = db::employees::headcount_by_department(&state.pool).await?;
    let pending_leaves = db::leaves::count_pending(&state.pool).await?;
    let certifications = db::certifications::count_all(&state.pool).await?;

    let departments: Vec<serde_json::Value> = by_department
        .into_iter()
        .map(|(department, count)| json!({ "department": department, "count": count }))
        .collect();

    Ok(ApiResponse::ok(json!({
        "employees": {
            "total": total,
            "active": active,
            "terminated": terminated,
            "suspended": suspended,
        },
        "departments": departments,
        "pending_leaves": pending_leaves,
        "certifications": certifications,
    })))
}
