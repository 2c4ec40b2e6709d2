use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{encode_token, Claims};
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::models::employee::{self, EmployeeView, STATUS_ACTIVE};
use crate::response::ApiResponse;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct FirstLoginRequest {
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub is_first_login: bool,
    pub employee: EmployeeView,
}

pub fn generate_reset_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    if state.login_limiter.check(&req.email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let found = db::employees::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify(&req.password, &found.password_hash)
        .map_err(AppError::Internal)?;

    if !valid {
        state.login_limiter.record_failure(&req.email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    if found.status != STATUS_ACTIVE {
        return Err(AppError::Forbidden(
            "Account is not active. Contact your HR department.".to_string(),
        ));
    }

    db::employees::record_login(&state.pool, found.id).await?;

    let claims = Claims::new(found.id, found.role.clone());
    let token = encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let view = employee::project(&found, found.id, &found.role);
    Ok(ApiResponse::ok(LoginResponse {
        token,
        is_first_login: found.is_first_login,
        employee: view,
    }))
}

pub async fn me(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<EmployeeView>>, AppError> {
    let found = db::employees::find_by_id(&state.pool, auth.employee_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account not found".to_string()))?;

    Ok(ApiResponse::ok(employee::project(
        &found,
        auth.employee_id,
        &auth.role,
    )))
}

/// Bearer tokens are stateless; logout exists so clients have a uniform
/// endpoint to call when discarding theirs.
pub async fn logout(_auth: AuthUser) -> Json<ApiResponse<serde_json::Value>> {
    ApiResponse::message("Logged out successfully")
}

pub async fn change_password(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if req.new_password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let found = db::employees::find_by_id(&state.pool, auth.employee_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account not found".to_string()))?;

    let valid = password::verify(&req.current_password, &found.password_hash)
        .map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;
    db::employees::update_password(&state.pool, found.id, &pw_hash).await?;

    if let Some(mailer) = state.system_mailer.clone() {
        let email = found.email.clone();
        let name = found.first_name.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_password_changed(&email, &name).await {
                tracing::error!("Failed to send password change notice: {e}");
            }
        });
    }

    Ok(ApiResponse::message("Password changed successfully"))
}

/// One-shot forced password change for accounts still on their temporary
/// credentials.
pub async fn first_login(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<FirstLoginRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if req.new_password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let found = db::employees::find_by_id(&state.pool, auth.employee_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account not found".to_string()))?;

    if !found.is_first_login {
        return Err(AppError::BadRequest(
            "First-login password change has already been completed".to_string(),
        ));
    }

    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;
    db::employees::update_password(&state.pool, found.id, &pw_hash).await?;

    Ok(ApiResponse::message("Password set successfully"))
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    // Always 200 so the response never reveals whether the email exists
    let response = ApiResponse::message("If that email is registered, a reset link has been sent.");

    let pool = state.pool.clone();
    let mailer = state.system_mailer.clone();
    let base_url = state.config.base_url.clone();

    tokio::spawn(async move {
        if let Ok(Some(found)) = db::employees::find_by_email(&pool, &req.email).await {
            let token = generate_reset_token();
            let token_hash = hash_token(&token);

            if db::password_resets::create(
                &pool,
                found.id,
                &token_hash,
                Utc::now() + Duration::hours(1),
            )
            .await
            .is_ok()
            {
                if let Some(mailer) = mailer {
                    let reset_url = format!("{base_url}/reset-password?token={token}");
                    if let Err(e) = mailer.send_password_reset(&found.email, &reset_url).await {
                        tracing::error!("Failed to send password reset email: {e}");
                    }
                } else {
                    tracing::warn!("System SMTP not configured. Password reset token: {token}");
                }
            }
        }
    });

    Ok(response)
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let token_hash = hash_token(&req.token);

    let reset = db::password_resets::find_valid_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

    db::password_resets::mark_used(&state.pool, reset.id).await?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    db::employees::update_password(&state.pool, reset.employee_id, &pw_hash).await?;

    Ok(ApiResponse::message("Password reset successfully"))
}
