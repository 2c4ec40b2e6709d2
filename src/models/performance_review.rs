use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PerformanceReview {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub year: i32,
    pub rating: i32,
    pub comments: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub review_date: DateTime<Utc>,
}
