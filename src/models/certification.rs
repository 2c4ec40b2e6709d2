use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Certification {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub category: String,
    pub skill_level: String,
    pub file_path: Option<String>,
    pub status: String,
    pub impact_score: i32,
    pub salary_impact: f64,
    pub created_at: DateTime<Utc>,
}
