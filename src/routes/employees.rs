use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::password;
use crate::db;
use crate::db::employees::NewEmployee;
use crate::error::AppError;
use crate::models::employee::{self, EmployeeView, ROLES, ROLE_EMPLOYEE, STATUS_TERMINATED};
use crate::models::PerformanceReview;
use crate::response::{ApiResponse, Pagination};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct EmployeeList {
    pub employees: Vec<EmployeeView>,
    pub pagination: Pagination,
}

pub async fn list(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<EmployeeList>>, AppError> {
    // Non-managerial staff only ever see their own record
    if auth.role == ROLE_EMPLOYEE {
        let own = db::employees::find_by_id(&state.pool, auth.employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
        let view = employee::project(&own, auth.employee_id, &auth.role);
        return Ok(ApiResponse::ok(EmployeeList {
            employees: vec![view],
            pagination: Pagination::new(1, 1, 1),
        }));
    }

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let rows = db::employees::list(
        &state.pool,
        query.department.as_deref(),
        query.status.as_deref(),
        query.search.as_deref(),
        limit,
        offset,
    )
    .await?;
    let total = db::employees::count(
        &state.pool,
        query.department.as_deref(),
        query.status.as_deref(),
        query.search.as_deref(),
    )
    .await?;

    let employees = rows
        .iter()
        .map(|e| employee::project(e, auth.employee_id, &auth.role))
        .collect();

    Ok(ApiResponse::ok(EmployeeList {
        employees,
        pagination: Pagination::new(page, limit, total),
    }))
}

#[derive(Deserialize)]
pub struct CreateEmployeeRequest {
    pub employee_code: String,
    pub email: String,
    pub role: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub department: String,
    pub designation: String,
    pub joining_date: NaiveDate,
    pub employment_type: Option<String>,
    pub work_location: Option<String>,
    pub reporting_manager: Option<Uuid>,
    pub basic_salary: Option<f64>,
    pub salary_allowances: Option<f64>,
    pub currency: Option<String>,
}

pub async fn create(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<Json<ApiResponse<EmployeeView>>, AppError> {
    auth.require_hr_or_admin()?;

    if req.employee_code.is_empty() || req.email.is_empty() {
        return Err(AppError::BadRequest(
            "Employee code and email are required".to_string(),
        ));
    }

    let role = req.role.as_deref().unwrap_or(ROLE_EMPLOYEE);
    if !ROLES.contains(&role) {
        return Err(AppError::BadRequest(format!("Unknown role: {role}")));
    }

    let temp_password = password::generate_temporary();
    let pw_hash = password::hash(&temp_password).map_err(AppError::Internal)?;

    let created = db::employees::create(
        &state.pool,
        &NewEmployee {
            employee_code: &req.employee_code,
            email: &req.email,
            password_hash: &pw_hash,
            role,
            first_name: &req.first_name,
            last_name: &req.last_name,
            phone: req.phone.as_deref(),
            date_of_birth: req.date_of_birth,
            department: &req.department,
            designation: &req.designation,
            joining_date: req.joining_date,
            employment_type: req.employment_type.as_deref().unwrap_or("full-time"),
            work_location: req.work_location.as_deref().unwrap_or("Office"),
            reporting_manager: req.reporting_manager,
            basic_salary: req.basic_salary.unwrap_or(0.0),
            salary_allowances: req.salary_allowances.unwrap_or(0.0),
            currency: req.currency.as_deref().unwrap_or("USD"),
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => AppError::Conflict(
            "An employee with that code or email already exists".to_string(),
        ),
        other => AppError::Database(other),
    })?;

    if let Some(mailer) = state.system_mailer.clone() {
        let email = created.email.clone();
        let name = created.first_name.clone();
        let code = created.employee_code.clone();
        let base_url = state.config.base_url.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer
                .send_welcome(&email, &name, &code, &temp_password, &base_url)
                .await
            {
                tracing::error!("Failed to send welcome email: {e}");
            }
        });
    } else {
        tracing::warn!(
            "System SMTP not configured. Temporary password for {}: {temp_password}",
            created.employee_code
        );
    }

    Ok(ApiResponse::ok_with_message(
        employee::project(&created, auth.employee_id, &auth.role),
        "Employee created. Temporary credentials have been emailed.",
    ))
}

pub async fn get(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmployeeView>>, AppError> {
    if auth.role == ROLE_EMPLOYEE && auth.employee_id != id {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let found = db::employees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(ApiResponse::ok(employee::project(
        &found,
        auth.employee_id,
        &auth.role,
    )))
}

#[derive(Deserialize, Default)]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub address_zip: Option<String>,
    pub address_country: Option<String>,
    pub profile_picture: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub employment_type: Option<String>,
    pub work_location: Option<String>,
    pub reporting_manager: Option<Uuid>,
    pub basic_salary: Option<f64>,
    pub salary_allowances: Option<f64>,
    pub currency: Option<String>,
}

impl UpdateEmployeeRequest {
    /// Fields beyond personal contact details need HR or admin rights.
    fn touches_restricted_fields(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.date_of_birth.is_some()
            || self.department.is_some()
            || self.designation.is_some()
            || self.employment_type.is_some()
            || self.work_location.is_some()
            || self.reporting_manager.is_some()
            || self.basic_salary.is_some()
            || self.salary_allowances.is_some()
            || self.currency.is_some()
    }
}

pub async fn update(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> Result<Json<ApiResponse<EmployeeView>>, AppError> {
    let is_self = auth.employee_id == id;
    if !is_self && !auth.is_hr_or_admin() {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    if !auth.is_hr_or_admin() && req.touches_restricted_fields() {
        return Err(AppError::Forbidden(
            "Only contact details can be updated on your own profile".to_string(),
        ));
    }

    let mut found = db::employees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    if let Some(v) = req.first_name {
        found.first_name = v;
    }
    if let Some(v) = req.last_name {
        found.last_name = v;
    }
    if let Some(v) = req.phone {
        found.phone = Some(v);
    }
    if let Some(v) = req.date_of_birth {
        found.date_of_birth = Some(v);
    }
    if let Some(v) = req.address_street {
        found.address_street = Some(v);
    }
    if let Some(v) = req.address_city {
        found.address_city = Some(v);
    }
    if let Some(v) = req.address_state {
        found.address_state = Some(v);
    }
    if let Some(v) = req.address_zip {
        found.address_zip = Some(v);
    }
    if let Some(v) = req.address_country {
        found.address_country = Some(v);
    }
    if let Some(v) = req.profile_picture {
        found.profile_picture = Some(v);
    }
    if let Some(v) = req.department {
        found.department = v;
    }
    if let Some(v) = req.designation {
        found.designation = v;
    }
    if let Some(v) = req.employment_type {
        found.employment_type = v;
    }
    if let Some(v) = req.work_location {
        found.work_location = v;
    }
    if let Some(v) = req.reporting_manager {
        found.reporting_manager = Some(v);
    }
    if let Some(v) = req.basic_salary {
        found.basic_salary = v;
    }
    if let Some(v) = req.salary_allowances {
        found.salary_allowances = v;
    }
    if let Some(v) = req.currency {
        found.currency = v;
    }

    let updated = db::employees::update_profile(&state.pool, &found).await?;
    Ok(ApiResponse::ok(employee::project(
        &updated,
        auth.employee_id,
        &auth.role,
    )))
}

/// Soft deactivation. Hard deletion lives under the admin routes and refuses
/// while history rows exist.
pub async fn deactivate(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_hr_or_admin()?;

    if auth.employee_id == id {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    let found = db::employees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    db::employees::update_status(&state.pool, found.id, STATUS_TERMINATED).await?;
    Ok(ApiResponse::message("Employee deactivated"))
}

pub async fn dashboard_stats(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    auth.require_hr_or_admin()?;

    let total = db::employees::count_all(&state.pool).await?;
    let active = db::employees::count_by_status(&state.pool, "active").await?;
    let by_department = db::employees::headcount_by_department(&state.pool).await?;
    let pending_leaves = db::leaves::count_pending(&state.pool).await?;
    let today = Utc::now().date_naive();
    let present_today = db::attendance::count_for_day(&state.pool, today).await?;

    let departments: Vec<serde_json::Value> = by_department
        .into_iter()
        .map(|(department, count)| json!({ "department": department, "count": count }))
        .collect();

    Ok(ApiResponse::ok(json!({
        "total_employees": total,
        "active_employees": active,
        "departments": departments,
        "pending_leaves": pending_leaves,
        "present_today": present_today,
    })))
}

#[derive(Deserialize)]
pub struct AddReviewRequest {
    pub year: Option<i32>,
    pub rating: i32,
    pub comments: Option<String>,
}

pub async fn list_performance(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PerformanceReview>>>, AppError> {
    auth.require_self_or_hr(id)?;
    let reviews = db::performance_reviews::list_by_employee(&state.pool, id).await?;
    Ok(ApiResponse::ok(reviews))
}

pub async fn add_performance(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddReviewRequest>,
) -> Result<Json<ApiResponse<PerformanceReview>>, AppError> {
    auth.require_hr_or_admin()?;

    if !(1..=5).contains(&req.rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    db::employees::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let year = req.year.unwrap_or_else(|| Utc::now().year());
    let review = db::performance_reviews::create(
        &state.pool,
        id,
        year,
        req.rating,
        req.comments.as_deref(),
        auth.employee_id,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!("A review for {year} already exists"))
        }
        other => AppError::Database(other),
    })?;

    Ok(ApiResponse::ok(review))
}
