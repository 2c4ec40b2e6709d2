use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PerformanceReview;

/// One review per (employee, year); duplicates fail with a unique violation
/// for the caller to map.
pub async fn create(
    pool: &PgPool,
    employee_id: Uuid,
    year: i32,
    rating: i32,
    comments: Option<&str>,
    reviewed_by: Uuid,
) -> Result<PerformanceReview, sqlx::Error> {
    sqlx::query_as::<_, PerformanceReview>(
        "INSERT INTO performance_reviews (employee_id, year, rating, comments, reviewed_by)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(employee_id)
    .bind(year)
    .bind(rating)
    .bind(comments)
    .bind(reviewed_by)
    .fetch_one(pool)
    .await
}

pub async fn list_by_employee(
    pool: &PgPool,
    employee_id: Uuid,
) -> Result<Vec<PerformanceReview>, sqlx::Error> {
    sqlx::query_as::<_, PerformanceReview>(
        "SELECT * FROM performance_reviews WHERE employee_id = $1 ORDER BY year DESC",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await
}
