use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::jwt;
use crate::error::AppError;
use crate::models::employee::{ROLE_ADMIN, ROLE_HR};
use crate::state::SharedState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn is_hr_or_admin(&self) -> bool {
        self.role == ROLE_HR || self.role == ROLE_ADMIN
    }

    pub fn require_hr_or_admin(&self) -> Result<(), AppError> {
        if self.is_hr_or_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("HR or admin access required".to_string()))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == ROLE_ADMIN {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Record access: the owner, HR, and admins.
    pub fn require_self_or_hr(&self, owner: Uuid) -> Result<(), AppError> {
        if self.employee_id == owner || self.is_hr_or_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Access denied".to_string()))
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let claims = jwt::decode_token(token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthUser {
            employee_id: claims.sub,
            role: claims.role,
        })
    }
}
