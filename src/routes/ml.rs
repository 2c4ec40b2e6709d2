use axum::extract::{Path, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::SharedState;

fn upstream_error(e: reqwest::Error) -> AppError {
    if e.is_connect() || e.is_timeout() {
        AppError::ServiceUnavailable("ML service is unavailable".to_string())
    } else {
        AppError::Internal(format!("ML service request failed: {e}"))
    }
}

/// Aggregate workforce features and hand them to the ML service for training.
pub async fn train(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_admin()?;

    let today = Utc::now().date_naive();
    let six_months_ago = today - Duration::days(180);

    let employees = db::employees::list_active(&state.pool).await?;
    let mut samples = Vec::with_capacity(employees.len());
    for employee in &employees {
        let (present, half, late, absent, hours) =
            db::attendance::range_summary(&state.pool, employee.id, six_months_ago, today).await?;
        let cert_impact = db::certifications::total_salary_impact(&state.pool, employee.id).await?;
        let certs = db::certifications::list_by_employee(&state.pool, employee.id).await?;

        samples.push(json!({
            "employee_id": employee.id,
            "department": employee.department,
            "basic_salary": employee.basic_salary,
            "attendance": {
                "present": present,
                "half_days": half,
                "late": late,
                "absent": absent,
                "total_hours": hours,
            },
            "certifications": {
                "count": certs.len(),
                "salary_impact": cert_impact,
            },
        }));
    }

    let url = format!("{}/train", state.config.ml_service_url);
    let response = state
        .http
        .post(&url)
        .json(&json!({ "samples": samples }))
        .send()
        .await
        .map_err(upstream_error)?;

    if !response.status().is_success() {
        return Err(AppError::Internal(format!(
            "ML service returned {}",
            response.status()
        )));
    }

    let body: serde_json::Value = response.json().await.map_err(upstream_error)?;
    tracing::info!("ML training submitted with {} samples", samples.len());
    Ok(ApiResponse::ok(body))
}

/// Forward one employee's recent metrics to the ML service for a prediction.
pub async fn predict(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_self_or_hr(employee_id)?;

    let employee = db::employees::find_by_id(&state.pool, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let today = Utc::now().date_naive();
    let three_months_ago = today - Duration::days(90);
    let (present, half, late, absent, hours) =
        db::attendance::range_summary(&state.pool, employee_id, three_months_ago, today).await?;
    let cert_impact = db::certifications::total_salary_impact(&state.pool, employee_id).await?;
    let certs = db::certifications::list_by_employee(&state.pool, employee_id).await?;

    let url = format!("{}/predict", state.config.ml_service_url);
    let response = state
        .http
        .post(&url)
        .json(&json!({
            "employee_id": employee_id,
            "department": employee.department,
            "attendance": {
                "present": present,
                "half_days": half,
                "late": late,
                "absent": absent,
                "total_hours": hours,
            },
            "certifications": {
                "count": certs.len(),
                "salary_impact": cert_impact,
            },
        }))
        .send()
        .await
        .map_err(upstream_error)?;

    if !response.status().is_success() {
        return Err(AppError::Internal(format!(
            "ML service returned {}",
            response.status()
        )));
    }

    let body: serde_json::Value = response.json().await.map_err(upstream_error)?;
    Ok(ApiResponse::ok(body))
}
