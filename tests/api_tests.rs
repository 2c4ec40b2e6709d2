mod common;

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use reqwest::StatusCode;
use serde_json::json;

/// First Monday at least a week out, so leave requests are never in the past.
fn next_monday() -> NaiveDate {
    let mut day = Utc::now().date_naive() + Duration::days(7);
    while day.weekday() != Weekday::Mon {
        day = day.succ_opt().unwrap();
    }
    day
}

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    common::cleanup(app).await;
}

// ── Auth ────────────────────────────────────────────────────────

#[tokio::test]
async fn login_valid_credentials() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "jess@test.com", "password123", "employee", 3000.0)
        .await;

    let (body, status) = app.try_login("jess@test.com", "password123").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["employee"]["email"], "jess@test.com");

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_invalid_credentials() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "jess@test.com", "password123", "employee", 3000.0)
        .await;

    let (_, status) = app.try_login("jess@test.com", "wrongpassword").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_rejects_terminated_account() {
    let app = common::spawn_app().await;
    let id = app
        .seed_employee("EMP001", "gone@test.com", "password123", "employee", 3000.0)
        .await;
    sqlx::query("UPDATE employees SET status = 'terminated' WHERE id = $1")
        .bind(id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (_, status) = app.try_login("gone@test.com", "password123").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

#[tokio::test]
async fn me_requires_token() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/api/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn change_password_requires_current() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "jess@test.com", "password123", "employee", 3000.0)
        .await;
    let token = app.login("jess@test.com", "password123").await;

    let (_, status) = app
        .post_auth(
            "/api/auth/change-password",
            &token,
            &json!({ "current_password": "nope", "new_password": "newpassword1" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, status) = app
        .post_auth(
            "/api/auth/change-password",
            &token,
            &json!({ "current_password": "password123", "new_password": "newpassword1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.try_login("jess@test.com", "newpassword1").await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

// ── Employee projection ─────────────────────────────────────────

#[tokio::test]
async fn salary_is_redacted_for_non_privileged_viewers() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 4000.0)
        .await;
    app.seed_employee("MGR001", "mgr@test.com", "password123", "manager", 6000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;

    // A manager sees the list but not other people's pay
    let mgr_token = app.login("mgr@test.com", "password123").await;
    let (body, status) = app.get_auth("/api/employees", &mgr_token).await;
    assert_eq!(status, StatusCode::OK);
    let dev = body["data"]["employees"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["email"] == "dev@test.com")
        .unwrap();
    assert!(dev["basic_salary"].is_null());

    // HR sees it
    let hr_token = app.login("hr@test.com", "password123").await;
    let (body, _) = app.get_auth("/api/employees", &hr_token).await;
    let dev = body["data"]["employees"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["email"] == "dev@test.com")
        .unwrap();
    assert_eq!(dev["basic_salary"], 4000.0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn employee_list_is_restricted_to_self() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "a@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("EMP002", "b@test.com", "password123", "employee", 3000.0)
        .await;

    let token = app.login("a@test.com", "password123").await;
    let (body, status) = app.get_auth("/api/employees", &token).await;
    assert_eq!(status, StatusCode::OK);
    let employees = body["data"]["employees"].as_array().unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0]["email"], "a@test.com");

    common::cleanup(app).await;
}

#[tokio::test]
async fn employee_creation_requires_hr() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let token = app.login("dev@test.com", "password123").await;

    let (_, status) = app
        .post_auth(
            "/api/employees",
            &token,
            &json!({
                "employee_code": "EMP099",
                "email": "new@test.com",
                "first_name": "New",
                "last_name": "Hire",
                "department": "Sales",
                "designation": "Rep",
                "joining_date": "2025-01-06",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

#[tokio::test]
async fn duplicate_employee_code_conflicts() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    let token = app.login("hr@test.com", "password123").await;

    let (_, status) = app
        .post_auth(
            "/api/employees",
            &token,
            &json!({
                "employee_code": "EMP001",
                "email": "other@test.com",
                "first_name": "Dup",
                "last_name": "Code",
                "department": "Sales",
                "designation": "Rep",
                "joining_date": "2025-01-06",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

// ── Leave lifecycle ─────────────────────────────────────────────

#[tokio::test]
async fn leave_approve_deducts_and_cancel_restores() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;
    let hr = app.login("hr@test.com", "password123").await;

    let monday = next_monday();
    let friday = monday + Duration::days(4);

    let (body, status) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "annual",
                "start_date": monday,
                "end_date": friday,
                "reason": "Family trip",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "apply failed: {body}");
    assert_eq!(body["data"]["number_of_days"], 5.0);
    let leave_id = body["data"]["id"].as_str().unwrap().to_string();

    // Balance untouched while pending
    let (body, _) = app.get_auth("/api/leaves/balance", &dev).await;
    assert_eq!(body["data"]["annual"], 25.0);

    // Approve deducts
    let (body, status) = app
        .put_auth(&format!("/api/leaves/{leave_id}/approve"), &hr, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "approve failed: {body}");
    let (body, _) = app.get_auth("/api/leaves/balance", &dev).await;
    assert_eq!(body["data"]["annual"], 20.0);

    // Cancel restores exactly
    let (_, status) = app
        .put_auth(&format!("/api/leaves/{leave_id}/cancel"), &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (body, _) = app.get_auth("/api/leaves/balance", &dev).await;
    assert_eq!(body["data"]["annual"], 25.0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn repeated_approval_deducts_the_balance_once() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;
    let hr = app.login("hr@test.com", "password123").await;

    let monday = next_monday();
    let (body, _) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "annual",
                "start_date": monday,
                "end_date": monday + Duration::days(4),
                "reason": "Family trip",
            }),
        )
        .await;
    let leave_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, status) = app
        .put_auth(&format!("/api/leaves/{leave_id}/approve"), &hr, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    // A second approval of the same request must not drain the balance again
    let (_, status) = app
        .put_auth(&format!("/api/leaves/{leave_id}/approve"), &hr, &json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (body, _) = app.get_auth("/api/leaves/balance", &dev).await;
    assert_eq!(body["data"]["annual"], 20.0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn repeated_cancellation_restores_the_balance_once() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;
    let hr = app.login("hr@test.com", "password123").await;

    let monday = next_monday();
    let (body, _) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "annual",
                "start_date": monday,
                "end_date": monday + Duration::days(4),
                "reason": "Family trip",
            }),
        )
        .await;
    let leave_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, status) = app
        .put_auth(&format!("/api/leaves/{leave_id}/approve"), &hr, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, status) = app
        .put_auth(&format!("/api/leaves/{leave_id}/cancel"), &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    // A second cancellation must not hand the days back twice
    let (_, status) = app
        .put_auth(&format!("/api/leaves/{leave_id}/cancel"), &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (body, _) = app.get_auth("/api/leaves/balance", &dev).await;
    assert_eq!(body["data"]["annual"], 25.0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn overlapping_leave_is_rejected() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let monday = next_monday();
    let base = json!({
        "leave_type": "annual",
        "start_date": monday,
        "end_date": monday + Duration::days(4),
        "reason": "Trip",
    });
    let (_, status) = app.post_auth("/api/leaves", &dev, &base).await;
    assert_eq!(status, StatusCode::OK);

    // Touching the existing range at one endpoint still counts
    let (_, status) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "casual",
                "start_date": monday + Duration::days(4),
                "end_date": monday + Duration::days(7),
                "reason": "Errand",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn leave_cannot_start_in_the_past() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let (_, status) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "sick",
                "start_date": yesterday,
                "end_date": yesterday,
                "reason": "Late paperwork",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn leave_exceeding_balance_is_rejected() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let monday = next_monday();
    let (_, status) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "casual",
                "start_date": monday,
                "end_date": monday + Duration::days(30),
                "reason": "Sabbatical",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn leave_approval_requires_hr() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let monday = next_monday();
    let (body, _) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "annual",
                "start_date": monday,
                "end_date": monday,
                "reason": "Day off",
            }),
        )
        .await;
    let leave_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, status) = app
        .put_auth(&format!("/api/leaves/{leave_id}/approve"), &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

#[tokio::test]
async fn rejected_leave_cannot_be_approved_again() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;
    let hr = app.login("hr@test.com", "password123").await;

    let monday = next_monday();
    let (body, _) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "annual",
                "start_date": monday,
                "end_date": monday,
                "reason": "Day off",
            }),
        )
        .await;
    let leave_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, status) = app
        .put_auth(
            &format!("/api/leaves/{leave_id}/reject"),
            &hr,
            &json!({ "rejection_reason": "Short staffed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app
        .put_auth(&format!("/api/leaves/{leave_id}/approve"), &hr, &json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

// ── Payroll ─────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_payroll_period_conflicts() {
    let app = common::spawn_app().await;
    let dev_id = app
        .seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    let hr = app.login("hr@test.com", "password123").await;

    let body = json!({ "employee_id": dev_id, "month": 5, "year": 2025 });
    let (resp, status) = app.post_auth("/api/payroll", &hr, &body).await;
    assert_eq!(status, StatusCode::OK, "create failed: {resp}");

    let (_, status) = app.post_auth("/api/payroll", &hr, &body).await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn payroll_update_recomputes_totals() {
    let app = common::spawn_app().await;
    let dev_id = app
        .seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    let hr = app.login("hr@test.com", "password123").await;

    let (body, _) = app
        .post_auth(
            "/api/payroll",
            &hr,
            &json!({ "employee_id": dev_id, "month": 5, "year": 2025 }),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (body, status) = app
        .put_auth(
            &format!("/api/payroll/{id}"),
            &hr,
            &json!({
                "basic_salary": 3000.0,
                "allowances": { "housing": 500.0 },
                "deductions": { "tax": 200.0 },
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "update failed: {body}");
    assert_eq!(body["data"]["gross_salary"], 3500.0);
    assert_eq!(body["data"]["total_deductions"], 200.0);
    assert_eq!(body["data"]["net_salary"], 3300.0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn paid_payroll_is_immutable() {
    let app = common::spawn_app().await;
    let dev_id = app
        .seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    let hr = app.login("hr@test.com", "password123").await;

    let (body, _) = app
        .post_auth(
            "/api/payroll",
            &hr,
            &json!({ "employee_id": dev_id, "month": 6, "year": 2025 }),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Cannot pay before approval
    let (_, status) = app
        .put_auth(&format!("/api/payroll/{id}/pay"), &hr, &json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, status) = app
        .put_auth(&format!("/api/payroll/{id}/approve"), &hr, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (body, status) = app
        .put_auth(
            &format!("/api/payroll/{id}/pay"),
            &hr,
            &json!({ "transaction_id": "TXN-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment_status"], "paid");

    // No edits once paid
    let (_, status) = app
        .put_auth(
            &format!("/api/payroll/{id}"),
            &hr,
            &json!({ "basic_salary": 9999.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn payroll_generate_skips_existing_periods() {
    let app = common::spawn_app().await;
    let dev_id = app
        .seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("EMP002", "dev2@test.com", "password123", "employee", 3500.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    let hr = app.login("hr@test.com", "password123").await;

    // One employee already has the period
    let (_, status) = app
        .post_auth(
            "/api/payroll",
            &hr,
            &json!({ "employee_id": dev_id, "month": 7, "year": 2025 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (body, status) = app
        .post_auth("/api/payroll/generate", &hr, &json!({ "month": 7, "year": 2025 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["skipped"], 1);
    assert_eq!(body["data"]["created"], 2);

    common::cleanup(app).await;
}

// ── Attendance ──────────────────────────────────────────────────

#[tokio::test]
async fn check_in_is_once_per_day() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let (body, status) = app
        .post_auth("/api/attendance/check-in", &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "check-in failed: {body}");
    assert_eq!(body["data"]["status"], "Present");

    let (_, status) = app
        .post_auth("/api/attendance/check-in", &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn check_out_requires_open_check_in() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let (_, status) = app
        .post_auth("/api/attendance/check-out", &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app
        .post_auth("/api/attendance/check-in", &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (body, status) = app
        .post_auth("/api/attendance/check-out", &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    // Immediate check-out earns Late status with ~0 hours
    assert_eq!(body["data"]["status"], "Late");

    let (_, status) = app
        .post_auth("/api/attendance/check-out", &dev, &json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn today_reports_check_in_capability() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let (body, _) = app.get_auth("/api/attendance/today", &dev).await;
    assert_eq!(body["data"]["can_check_in"], true);
    assert_eq!(body["data"]["can_check_out"], false);

    app.post_auth("/api/attendance/check-in", &dev, &json!({}))
        .await;

    let (body, _) = app.get_auth("/api/attendance/today", &dev).await;
    assert_eq!(body["data"]["can_check_in"], false);
    assert_eq!(body["data"]["can_check_out"], true);

    common::cleanup(app).await;
}

// ── Certifications ──────────────────────────────────────────────

#[tokio::test]
async fn certification_scores_expert_technical_at_25() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let form = reqwest::multipart::Form::new()
        .text("name", "Distributed Systems Architect")
        .text("issuing_organization", "Cloud Guild")
        .text("issue_date", "2024-03-01")
        .text("category", "Technical")
        .text("skill_level", "Expert");

    let resp = app
        .client
        .post(app.url("/api/certifications"))
        .bearer_auth(&dev)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["impact_score"], 25);
    assert_eq!(body["data"]["salary_impact"], 5.0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn expired_certification_scores_half() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let form = reqwest::multipart::Form::new()
        .text("name", "Legacy Stack Expert")
        .text("issuing_organization", "Old Guard")
        .text("issue_date", "2018-03-01")
        .text("expiration_date", "2020-03-01")
        .text("category", "Technical")
        .text("skill_level", "Expert");

    let resp = app
        .client
        .post(app.url("/api/certifications"))
        .bearer_auth(&dev)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    // 25 * 0.5 = 12.5, rounded half away from zero
    assert_eq!(body["data"]["impact_score"], 13);

    common::cleanup(app).await;
}

// ── Admin ───────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_are_gated() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;
    app.seed_employee("ADM001", "admin@test.com", "password123", "admin", 7000.0)
        .await;

    let dev = app.login("dev@test.com", "password123").await;
    let (_, status) = app.get_auth("/api/admin/users", &dev).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // HR is not admin either
    let hr = app.login("hr@test.com", "password123").await;
    let (_, status) = app.get_auth("/api/admin/users", &hr).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.login("admin@test.com", "password123").await;
    let (_, status) = app.get_auth("/api/admin/users", &admin).await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn hard_delete_refused_with_history() {
    let app = common::spawn_app().await;
    let dev_id = app
        .seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("ADM001", "admin@test.com", "password123", "admin", 7000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;
    let admin = app.login("admin@test.com", "password123").await;

    let monday = next_monday();
    let (_, status) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "annual",
                "start_date": monday,
                "end_date": monday,
                "reason": "Day off",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app
        .delete_auth(&format!("/api/admin/users/{dev_id}"), &admin)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn admin_cannot_change_own_role() {
    let app = common::spawn_app().await;
    let admin_id = app
        .seed_employee("ADM001", "admin@test.com", "password123", "admin", 7000.0)
        .await;
    let admin = app.login("admin@test.com", "password123").await;

    let (_, status) = app
        .put_auth(
            &format!("/api/admin/users/{admin_id}/role"),
            &admin,
            &json!({ "role": "employee" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

// ── Dashboard & ML ──────────────────────────────────────────────

#[tokio::test]
async fn dashboard_is_role_shaped() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    app.seed_employee("HR001", "hr@test.com", "password123", "hr", 5000.0)
        .await;

    let dev = app.login("dev@test.com", "password123").await;
    let (body, status) = app.get_auth("/api/dashboard", &dev).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["leave_balance"].is_object());
    assert!(body["data"]["employees"].is_null());

    let hr = app.login("hr@test.com", "password123").await;
    let (body, status) = app.get_auth("/api/dashboard", &hr).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["employees"].is_object());

    common::cleanup(app).await;
}

#[tokio::test]
async fn ml_proxy_maps_connection_failure_to_503() {
    let app = common::spawn_app().await;
    let dev_id = app
        .seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    // Test config points the ML service at an unreachable port
    let (_, status) = app
        .get_auth(&format!("/api/ml/predict/{dev_id}"), &dev)
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    common::cleanup(app).await;
}

// ── Calendar ────────────────────────────────────────────────────

#[tokio::test]
async fn calendar_shows_pending_and_approved_leave() {
    let app = common::spawn_app().await;
    app.seed_employee("EMP001", "dev@test.com", "password123", "employee", 3000.0)
        .await;
    let dev = app.login("dev@test.com", "password123").await;

    let monday = next_monday();
    let (_, status) = app
        .post_auth(
            "/api/leaves",
            &dev,
            &json!({
                "leave_type": "annual",
                "start_date": monday,
                "end_date": monday,
                "reason": "Day off",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (body, status) = app
        .get_auth(
            &format!(
                "/api/calendar/leaves?month={}&year={}",
                monday.month(),
                monday.year()
            ),
            &dev,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let events = body["data"]["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["leave_type"], "annual");

    common::cleanup(app).await;
}
