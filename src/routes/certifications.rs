use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::certifications::NewCertification;
use crate::error::AppError;
use crate::models::Certification;
use crate::response::ApiResponse;
use crate::rules::certification as rules;
use crate::state::SharedState;

const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

fn allowed_content_type(content_type: &str) -> bool {
    content_type == "application/pdf" || content_type.starts_with("image/")
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {value}")))
}

/// Multipart form: text fields for the certification, optional `file` part
/// with the credential document.
pub async fn upload(
    State(state): State<SharedState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Certification>>, AppError> {
    let mut name = None;
    let mut issuing_organization = None;
    let mut issue_date = None;
    let mut expiration_date = None;
    let mut credential_id = None;
    let mut credential_url = None;
    let mut category = "Technical".to_string();
    let mut skill_level = "Intermediate".to_string();
    let mut file_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let content_type = field.content_type().unwrap_or("").to_string();
                if !allowed_content_type(&content_type) {
                    return Err(AppError::BadRequest(
                        "Only PDF and image files are accepted".to_string(),
                    ));
                }
                let original = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Upload failed: {e}")))?;
                if data.len() > MAX_FILE_BYTES {
                    return Err(AppError::BadRequest(
                        "File exceeds the 10 MB limit".to_string(),
                    ));
                }

                let extension = std::path::Path::new(&original)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("bin");
                let stored = format!("{}/{}.{extension}", state.config.upload_dir, Uuid::now_v7());
                tokio::fs::create_dir_all(&state.config.upload_dir)
                    .await
                    .map_err(|e| AppError::Internal(format!("Upload dir error: {e}")))?;
                tokio::fs::write(&stored, &data)
                    .await
                    .map_err(|e| AppError::Internal(format!("Failed to store file: {e}")))?;
                file_path = Some(stored);
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid field: {e}")))?;
                match other {
                    "name" => name = Some(value),
                    "issuing_organization" => issuing_organization = Some(value),
                    "issue_date" => issue_date = Some(parse_date(&value)?),
                    "expiration_date" if !value.is_empty() => {
                        expiration_date = Some(parse_date(&value)?)
                    }
                    "credential_id" => credential_id = Some(value),
                    "credential_url" => credential_url = Some(value),
                    "category" => category = value,
                    "skill_level" => skill_level = value,
                    _ => {}
                }
            }
        }
    }

    let name = name.ok_or_else(|| AppError::BadRequest("Name is required".to_string()))?;
    let issuing_organization = issuing_organization
        .ok_or_else(|| AppError::BadRequest("Issuing organization is required".to_string()))?;
    let issue_date =
        issue_date.ok_or_else(|| AppError::BadRequest("Issue date is required".to_string()))?;

    let (impact_score, salary_impact) = rules::impact(
        &category,
        &skill_level,
        expiration_date,
        Utc::now().date_naive(),
    );

    let created = db::certifications::create(
        &state.pool,
        &NewCertification {
            employee_id: auth.employee_id,
            name: &name,
            issuing_organization: &issuing_organization,
            issue_date,
            expiration_date,
            credential_id: credential_id.as_deref(),
            credential_url: credential_url.as_deref(),
            category: &category,
            skill_level: &skill_level,
            file_path: file_path.as_deref(),
            impact_score,
            salary_impact,
        },
    )
    .await?;

    Ok(ApiResponse::ok_with_message(created, "Certification added"))
}

pub async fn my(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let certifications = db::certifications::list_by_employee(&state.pool, auth.employee_id).await?;

    let today = Utc::now().date_naive();
    let expiring_soon = db::certifications::count_expiring_within(
        &state.pool,
        auth.employee_id,
        today,
        today + chrono::Duration::days(30),
    )
    .await?;

    let total_impact: i64 = certifications.iter().map(|c| i64::from(c.impact_score)).sum();

    Ok(ApiResponse::ok(json!({
        "certifications": certifications,
        "stats": {
            "count": certifications.len(),
            "total_impact": total_impact,
            "expiring_within_30_days": expiring_soon,
        },
    })))
}

#[derive(Deserialize, Default)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub issuing_organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub category: Option<String>,
    pub skill_level: Option<String>,
    pub status: Option<String>,
}

pub async fn update(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<ApiResponse<Certification>>, AppError> {
    let mut cert = db::certifications::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Certification not found".to_string()))?;

    auth.require_self_or_hr(cert.employee_id)?;

    if let Some(v) = req.name {
        cert.name = v;
    }
    if let Some(v) = req.issuing_organization {
        cert.issuing_organization = v;
    }
    if let Some(v) = req.issue_date {
        cert.issue_date = v;
    }
    if let Some(v) = req.expiration_date {
        cert.expiration_date = Some(v);
    }
    if let Some(v) = req.credential_id {
        cert.credential_id = Some(v);
    }
    if let Some(v) = req.credential_url {
        cert.credential_url = Some(v);
    }
    if let Some(v) = req.category {
        cert.category = v;
    }
    if let Some(v) = req.skill_level {
        cert.skill_level = v;
    }
    if let Some(v) = req.status {
        cert.status = v;
    }

    // Category, skill, or expiry edits change the score
    let (impact_score, salary_impact) = rules::impact(
        &cert.category,
        &cert.skill_level,
        cert.expiration_date,
        Utc::now().date_naive(),
    );
    cert.impact_score = impact_score;
    cert.salary_impact = salary_impact;

    let updated = db::certifications::update(&state.pool, &cert).await?;
    Ok(ApiResponse::ok(updated))
}

pub async fn delete(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let cert = db::certifications::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Certification not found".to_string()))?;

    auth.require_self_or_hr(cert.employee_id)?;

    db::certifications::delete(&state.pool, id).await?;

    if let Some(path) = cert.file_path {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove certification file {path}: {e}");
        }
    }

    Ok(ApiResponse::message("Certification deleted"))
}

/// Certification value on a 0-100 scale with a per-category breakdown.
pub async fn analytics(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let certifications = db::certifications::list_by_employee(&state.pool, auth.employee_id).await?;
    let breakdown = db::certifications::category_breakdown(&state.pool, auth.employee_id).await?;

    let today = Utc::now().date_naive();
    let total_impact: i64 = certifications.iter().map(|c| i64::from(c.impact_score)).sum();
    let expired = certifications
        .iter()
        .filter(|c| c.expiration_date.is_some_and(|d| d <= today))
        .count();

    let categories: Vec<serde_json::Value> = breakdown
        .into_iter()
        .map(|(category, impact, count)| {
            json!({ "category": category, "impact": impact, "count": count })
        })
        .collect();

    Ok(ApiResponse::ok(json!({
        "certification_value": total_impact.min(100),
        "total_certifications": certifications.len(),
        "expired": expired,
        "categories": categories,
    })))
}

/// Estimated salary effect of the certification portfolio, capped at 30%.
pub async fn salary_prediction(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let certifications = db::certifications::list_by_employee(&state.pool, auth.employee_id).await?;
    let breakdown = db::certifications::category_breakdown(&state.pool, auth.employee_id).await?;

    let raw: f64 = certifications.iter().map(|c| c.salary_impact).sum();
    let predicted = raw.min(30.0);

    let today = Utc::now().date_naive();
    let mut recommendations = Vec::new();
    if certifications
        .iter()
        .any(|c| c.expiration_date.is_some_and(|d| d <= today))
    {
        recommendations
            .push("Renew expired certifications to restore their full impact".to_string());
    }
    for category in ["Technical", "Management", "Leadership"] {
        if !breakdown.iter().any(|(c, _, _)| c == category) {
            recommendations.push(format!("Consider a {category} certification"));
        }
    }

    let categories: Vec<serde_json::Value> = breakdown
        .into_iter()
        .map(|(category, impact, count)| {
            json!({ "category": category, "impact": impact, "count": count })
        })
        .collect();

    Ok(ApiResponse::ok(json!({
        "predicted_increase_percent": predicted,
        "uncapped_percent": raw,
        "categories": categories,
        "recommendations": recommendations,
    })))
}
