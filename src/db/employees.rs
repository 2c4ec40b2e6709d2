use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::Employee;

/// Insert parameters for a new employee record. Balances and status take
/// their column defaults.
pub struct NewEmployee<'a> {
    pub employee_code: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub department: &'a str,
    pub designation: &'a str,
    pub joining_date: NaiveDate,
    pub employment_type: &'a str,
    pub work_location: &'a str,
    pub reporting_manager: Option<Uuid>,
    pub basic_salary: f64,
    pub salary_allowances: f64,
    pub currency: &'a str,
}

pub async fn create(pool: &PgPool, new: &NewEmployee<'_>) -> Result<Employee, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "INSERT INTO employees (employee_code, email, password_hash, role, first_name, last_name,
            phone, date_of_birth, department, designation, joining_date, employment_type,
            work_location, reporting_manager, basic_salary, salary_allowances, currency)
         VALUES ($1, lower($2), $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
         RETURNING *",
    )
    .bind(new.employee_code)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.role)
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.phone)
    .bind(new.date_of_birth)
    .bind(new.department)
    .bind(new.designation)
    .bind(new.joining_date)
    .bind(new.employment_type)
    .bind(new.work_location)
    .bind(new.reporting_manager)
    .bind(new.basic_salary)
    .bind(new.salary_allowances)
    .bind(new.currency)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE email = lower($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    department: Option<&str>,
    status: Option<&str>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees
         WHERE ($1::text IS NULL OR department = $1)
           AND ($2::text IS NULL OR status = $2)
           AND ($3::text IS NULL
                OR first_name ILIKE '%' || $3 || '%'
                OR last_name ILIKE '%' || $3 || '%'
                OR email ILIKE '%' || $3 || '%'
                OR employee_code ILIKE '%' || $3 || '%')
         ORDER BY created_at DESC
         LIMIT $4 OFFSET $5",
    )
    .bind(department)
    .bind(status)
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(
    pool: &PgPool,
    department: Option<&str>,
    status: Option<&str>,
    search: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM employees
         WHERE ($1::text IS NULL OR department = $1)
           AND ($2::text IS NULL OR status = $2)
           AND ($3::text IS NULL
                OR first_name ILIKE '%' || $3 || '%'
                OR last_name ILIKE '%' || $3 || '%'
                OR email ILIKE '%' || $3 || '%'
                OR employee_code ILIKE '%' || $3 || '%')",
    )
    .bind(department)
    .bind(status)
    .bind(search)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn list_active(pool: &PgPool) -> Result<Vec<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE status = 'active' ORDER BY employee_code",
    )
    .fetch_all(pool)
    .await
}

/// Rewrite the mutable profile and job columns from an already-modified row.
pub async fn update_profile(pool: &PgPool, employee: &Employee) -> Result<Employee, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "UPDATE employees SET
            first_name = $2, last_name = $3, phone = $4, date_of_birth = $5,
            address_street = $6, address_city = $7, address_state = $8,
            address_zip = $9, address_country = $10, profile_picture = $11,
            department = $12, designation = $13, employment_type = $14,
            work_location = $15, reporting_manager = $16, basic_salary = $17,
            salary_allowances = $18, currency = $19, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(employee.id)
    .bind(&employee.first_name)
    .bind(&employee.last_name)
    .bind(&employee.phone)
    .bind(employee.date_of_birth)
    .bind(&employee.address_street)
    .bind(&employee.address_city)
    .bind(&employee.address_state)
    .bind(&employee.address_zip)
    .bind(&employee.address_country)
    .bind(&employee.profile_picture)
    .bind(&employee.department)
    .bind(&employee.designation)
    .bind(&employee.employment_type)
    .bind(&employee.work_location)
    .bind(employee.reporting_manager)
    .bind(employee.basic_salary)
    .bind(employee.salary_allowances)
    .bind(&employee.currency)
    .fetch_one(pool)
    .await
}

pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE employees SET password_hash = $2, is_first_login = FALSE, updated_at = now()
         WHERE id = $1",
    )
    .bind(id)
    .bind(password_hash)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn record_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE employees SET last_login = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_role(pool: &PgPool, id: Uuid, role: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE employees SET role = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_status(pool: &PgPool, id: Uuid, status: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE employees SET status = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

fn balance_column(leave_type: &str) -> Option<&'static str> {
    match leave_type {
        "annual" => Some("balance_annual"),
        "sick" => Some("balance_sick"),
        "casual" => Some("balance_casual"),
        "maternity" => Some("balance_maternity"),
        "paternity" => Some("balance_paternity"),
        _ => None,
    }
}

/// Deduct leave days if and only if the balance covers them. The guard and
/// the write are one statement, so concurrent approvals cannot both succeed
/// past zero. Returns false when the balance was insufficient. Takes an
/// executor so it can join the leave status transition's transaction.
pub async fn deduct_balance<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    leave_type: &str,
    days: f64,
) -> Result<bool, sqlx::Error> {
    let Some(column) = balance_column(leave_type) else {
        return Ok(false);
    };
    let sql = format!(
        "UPDATE employees SET {column} = {column} - $2, updated_at = now()
         WHERE id = $1 AND {column} >= $2"
    );
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(days)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Give leave days back after a cancelled approval.
pub async fn restore_balance<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    leave_type: &str,
    days: f64,
) -> Result<(), sqlx::Error> {
    let Some(column) = balance_column(leave_type) else {
        return Ok(());
    };
    let sql =
        format!("UPDATE employees SET {column} = {column} + $2, updated_at = now() WHERE id = $1");
    sqlx::query(&sql)
        .bind(id)
        .bind(days)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn count_by_status(pool: &PgPool, status: &str) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees WHERE status = $1")
        .bind(status)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn headcount_by_department(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT department, COUNT(*) FROM employees
         WHERE status = 'active' GROUP BY department ORDER BY department",
    )
    .fetch_all(pool)
    .await
}
