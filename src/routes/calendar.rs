use axum::extract::{Query, State};
use axum::Json;
use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::SharedState;

fn display_color(leave_type: &str) -> &'static str {
    match leave_type {
        "annual" => "#2196f3",
        "sick" => "#f44336",
        "casual" => "#ff9800",
        "maternity" => "#9c27b0",
        "paternity" => "#009688",
        _ => "#757575",
    }
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub department: Option<String>,
}

fn resolve_month(query: &MonthQuery) -> Result<(NaiveDate, NaiveDate), AppError> {
    let now = Utc::now();
    let month = query.month.unwrap_or(now.month());
    let year = query.year.unwrap_or(now.year());
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest("Invalid month or year".to_string()))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::BadRequest("Invalid month or year".to_string()))?;
    Ok((first, last))
}

/// Month view of pending and approved leave, shaped as calendar events.
pub async fn leaves(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let (first, last) = resolve_month(&query)?;

    let leaves =
        db::leaves::list_for_range(&state.pool, first, last, query.department.as_deref()).await?;

    let mut events = Vec::with_capacity(leaves.len());
    for leave in &leaves {
        let employee = db::employees::find_by_id(&state.pool, leave.employee_id).await?;
        let name = employee
            .map(|e| e.full_name())
            .unwrap_or_else(|| "Unknown".to_string());
        events.push(json!({
            "id": leave.id,
            "title": format!("{name} - {}", leave.leave_type),
            "start": leave.start_date,
            "end": leave.end_date,
            "status": leave.status,
            "leave_type": leave.leave_type,
            "color": display_color(&leave.leave_type),
        }));
    }

    Ok(ApiResponse::ok(json!({ "events": events })))
}

/// Per-day availability for a month: active headcount minus approved leave.
pub async fn team_availability(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let (first, last) = resolve_month(&query)?;

    let active = db::employees::count_by_status(&state.pool, "active").await?;
    let leaves =
        db::leaves::list_for_range(&state.pool, first, last, query.department.as_deref()).await?;

    let mut days = Vec::new();
    let mut current = first;
    while current <= last {
        let on_leave = leaves
            .iter()
            .filter(|l| l.status == "approved" && l.start_date <= current && l.end_date >= current)
            .count() as i64;
        days.push(json!({
            "date": current,
            "on_leave": on_leave,
            "available": (active - on_leave).max(0),
        }));
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(ApiResponse::ok(json!({
        "active_employees": active,
        "days": days,
    })))
}
