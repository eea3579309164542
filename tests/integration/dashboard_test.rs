//! Integration tests for health, profile and dashboard.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health_needs_no_identity() {
    let Some(app) = TestApp::new().await else { return };

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");

    let detailed = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(detailed.status, StatusCode::OK);
    assert_eq!(detailed.data()["database"], "connected");
}

#[tokio::test]
async fn test_profile_reports_borrowing_capacity() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    app.borrow(user, book).await;

    let response = app.request("GET", "/api/users/me", None, Some(user)).await;

    assert_eq!(response.status, StatusCode::OK);
    let profile = response.data();
    assert_eq!(profile["id"], user.to_string());
    assert_eq!(profile["role"], "borrower");
    assert_eq!(profile["active_loans"], 1);
    assert_eq!(profile["max_active_loans"], 5);
    assert_eq!(profile["can_borrow"], true);
}

#[tokio::test]
async fn test_borrower_dashboard_hides_system_stats() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    let loan = app.borrow(user, book).await;

    let response = app.request("GET", "/api/dashboard", None, Some(user)).await;

    assert_eq!(response.status, StatusCode::OK);
    let dashboard = response.data();
    assert_eq!(dashboard["stats"]["user_loans"], 1);
    assert_eq!(dashboard["stats"]["overdue_loans"], 0);
    assert!(dashboard.get("system_stats").is_none());
    assert!(dashboard.get("recent_loans").is_none());

    let active = dashboard["user_active_loans"].as_array().expect("loans");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], loan.to_string());
}

#[tokio::test]
async fn test_staff_dashboard_includes_system_stats() {
    let Some(app) = TestApp::new().await else { return };
    let admin = app.create_user("admin").await;
    let borrower = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    app.borrow(borrower, book).await;

    let response = app.request("GET", "/api/dashboard", None, Some(admin)).await;

    assert_eq!(response.status, StatusCode::OK);
    let dashboard = response.data();
    let system = &dashboard["system_stats"];
    assert!(system["total_users"].as_i64().unwrap_or_default() >= 2);
    assert!(system["active_loans"].as_i64().unwrap_or_default() >= 1);
    assert!(dashboard["recent_loans"].is_array());
    assert_eq!(dashboard["stats"]["user_loans"], 0);
}
