use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Certification;

pub struct NewCertification<'a> {
    pub employee_id: Uuid,
    pub name: &'a str,
    pub issuing_organization: &'a str,
    pub issue_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
    pub credential_id: Option<&'a str>,
    pub credential_url: Option<&'a str>,
    pub category: &'a str,
    pub skill_level: &'a str,
    pub file_path: Option<&'a str>,
    pub impact_score: i32,
    pub salary_impact: f64,
}

pub async fn create(pool: &PgPool, new: &NewCertification<'_>) -> Result<Certification, sqlx::Error> {
    sqlx::query_as::<_, Certification>(
        "INSERT INTO certifications (employee_id, name, issuing_organization, issue_date,
            expiration_date, credential_id, credential_url, category, skill_level, file_path,
            impact_score, salary_impact)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
    )
    .bind(new.employee_id)
    .bind(new.name)
    .bind(new.issuing_organization)
    .bind(new.issue_date)
    .bind(new.expiration_date)
    .bind(new.credential_id)
    .bind(new.credential_url)
    .bind(new.category)
    .bind(new.skill_level)
    .bind(new.file_path)
    .bind(new.impact_score)
    .bind(new.salary_impact)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Certification>, sqlx::Error> {
    sqlx::query_as::<_, Certification>("SELECT * FROM certifications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_employee(
    pool: &PgPool,
    employee_id: Uuid,
) -> Result<Vec<Certification>, sqlx::Error> {
    sqlx::query_as::<_, Certification>(
        "SELECT * FROM certifications WHERE employee_id = $1 ORDER BY created_at DESC",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await
}

/// Rewrite the editable fields from an already-modified row, impact included.
pub async fn update(pool: &PgPool, cert: &Certification) -> Result<Certification, sqlx::Error> {
    sqlx::query_as::<_, Certification>(
        "UPDATE certifications SET name = $2, issuing_organization = $3, issue_date = $4,
            expiration_date = $5, credential_id = $6, credential_url = $7, category = $8,
            skill_level = $9, status = $10, impact_score = $11, salary_impact = $12
         WHERE id = $1 RETURNING *",
    )
    .bind(cert.id)
    .bind(&cert.name)
    .bind(&cert.issuing_organization)
    .bind(cert.issue_date)
    .bind(cert.expiration_date)
    .bind(&cert.credential_id)
    .bind(&cert.credential_url)
    .bind(&cert.category)
    .bind(&cert.skill_level)
    .bind(&cert.status)
    .bind(cert.impact_score)
    .bind(cert.salary_impact)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM certifications WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_expiring_within(
    pool: &PgPool,
    employee_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM certifications
         WHERE employee_id = $1 AND expiration_date BETWEEN $2 AND $3",
    )
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// (total impact, certification count) per category for one employee.
pub async fn category_breakdown(
    pool: &PgPool,
    employee_id: Uuid,
) -> Result<Vec<(String, i64, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT category, COALESCE(SUM(impact_score), 0), COUNT(*)
         FROM certifications WHERE employee_id = $1 GROUP BY category",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await
}

pub async fn total_salary_impact(pool: &PgPool, employee_id: Uuid) -> Result<f64, sqlx::Error> {
    let row: (f64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(salary_impact), 0) FROM certifications WHERE employee_id = $1",
    )
    .bind(employee_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM certifications")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
