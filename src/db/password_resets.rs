use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PasswordReset;

pub async fn create(
    pool: &PgPool,
    employee_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<PasswordReset, sqlx::Error> {
    sqlx::query_as::<_, PasswordReset>(
        "INSERT INTO password_resets (employee_id, token_hash, expires_at)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(employee_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_valid_by_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<PasswordReset>, sqlx::Error> {
    sqlx::query_as::<_, PasswordReset>(
        "SELECT * FROM password_resets
         WHERE token_hash = $1 AND used = FALSE AND expires_at > now()",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

pub async fn mark_used(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE password_resets SET used = TRUE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
