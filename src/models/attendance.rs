use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Attendance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub day: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub break_minutes: i32,
    pub total_hours: f64,
    pub status: String,
    pub location: String,
    pub notes: Option<String>,
    pub ip_address: Option<String>,
    pub device_info: Option<String>,
    pub created_at: DateTime<Utc>,
}
