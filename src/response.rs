use serde::Serialize;

/// Uniform response envelope: `{ "success": true, "data": ... }` on success,
/// `{ "success": false, "message": ... }` on failure (built by `AppError`).
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> axum::Json<Self> {
        axum::Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> axum::Json<Self> {
        axum::Json(Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        })
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn message(message: impl Into<String>) -> axum::Json<Self> {
        axum::Json(Self {
            success: true,
            message: Some(message.into()),
            data: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}
