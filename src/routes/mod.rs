pub mod admin;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod certifications;
pub mod dashboard;
pub mod employees;
pub mod leaves;
pub mod ml;
pub mod payroll;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/auth/first-login", post(auth::first_login))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        // Employees
        .route(
            "/api/employees",
            get(employees::list).post(employees::create),
        )
        .route(
            "/api/employees/stats/dashboard",
            get(employees::dashboard_stats),
        )
        .route(
            "/api/employees/{id}",
            get(employees::get)
                .put(employees::update)
                .delete(employees::deactivate),
        )
        .route(
            "/api/employees/{id}/performance",
            get(employees::list_performance).post(employees::add_performance),
        )
        // Leaves
        .route("/api/leaves", get(leaves::list).post(leaves::apply))
        .route("/api/leaves/my", get(leaves::my))
        .route("/api/leaves/balance", get(leaves::balance))
        .route("/api/leaves/{id}", get(leaves::get))
        .route("/api/leaves/{id}/approve", put(leaves::approve))
        .route("/api/leaves/{id}/reject", put(leaves::reject))
        .route("/api/leaves/{id}/cancel", put(leaves::cancel))
        // Payroll
        .route("/api/payroll", get(payroll::list).post(payroll::create))
        .route("/api/payroll/my", get(payroll::my))
        .route("/api/payroll/generate", post(payroll::generate))
        .route("/api/payroll/stats/summary", get(payroll::stats_summary))
        .route(
            "/api/payroll/{id}",
            get(payroll::get).put(payroll::update),
        )
        .route("/api/payroll/{id}/approve", put(payroll::approve))
        .route("/api/payroll/{id}/pay", put(payroll::pay))
        .route("/api/payroll/{id}/payslip", get(payroll::payslip))
        // Attendance
        .route("/api/attendance", get(attendance::list))
        .route("/api/attendance/check-in", post(attendance::check_in))
        .route("/api/attendance/check-out", post(attendance::check_out))
        .route("/api/attendance/my", get(attendance::my))
        .route("/api/attendance/today", get(attendance::today))
        .route("/api/attendance/summary", get(attendance::summary))
        .route("/api/attendance/stats", get(attendance::stats))
        .route(
            "/api/attendance/employee/{id}",
            get(attendance::employee_month),
        )
        // Certifications
        .route("/api/certifications", post(certifications::upload))
        .route("/api/certifications/my", get(certifications::my))
        .route("/api/certifications/analytics", get(certifications::analytics))
        .route(
            "/api/certifications/salary-prediction",
            get(certifications::salary_prediction),
        )
        .route(
            "/api/certifications/{id}",
            put(certifications::update).delete(certifications::delete),
        )
        // Dashboard
        .route("/api/dashboard", get(dashboard::get))
        // Admin
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}/role", put(admin::change_role))
        .route("/api/admin/users/{id}/status", put(admin::change_status))
        .route("/api/admin/users/{id}", delete(admin::delete_user))
        .route("/api/admin/analytics", get(admin::analytics))
        // Calendar
        .route("/api/calendar/leaves", get(calendar::leaves))
        .route(
            "/api/calendar/team-availability",
            get(calendar::team_availability),
        )
        // ML proxy
        .route("/api/ml/train", post(ml::train))
        .route("/api/ml/predict/{id}", get(ml::predict))
}
