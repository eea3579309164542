//! Integration tests for borrowing and returning.

use chrono::{DateTime, Duration, Utc};
use http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, send};

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("RFC 3339 timestamp")
}

#[tokio::test]
async fn test_borrow_marks_book_unavailable_with_default_due_date() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;

    let response = app
        .request("POST", &format!("/api/books/{book}/borrow"), None, Some(user))
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let loan = response.data();
    assert_eq!(loan["status"], "active");
    assert_eq!(loan["days_overdue"], 0);
    assert!(loan["returned_at"].is_null());

    let borrowed_at = timestamp(&loan["borrowed_at"]);
    let due_date = timestamp(&loan["due_date"]);
    assert_eq!(borrowed_at, app.clock_now());
    assert_eq!(due_date - borrowed_at, Duration::days(14));

    assert!(!app.book_available(book).await);
}

#[tokio::test]
async fn test_borrow_with_explicit_due_date() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    let due = app.clock_now() + Duration::days(7);

    let response = app
        .request(
            "POST",
            "/api/loans",
            Some(json!({ "book_id": book, "due_date": due })),
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(timestamp(&response.data()["due_date"]), due);
}

#[tokio::test]
async fn test_due_date_before_borrow_is_rejected() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    let due = app.clock_now() - Duration::days(1);

    let response = app
        .request(
            "POST",
            &format!("/api/books/{book}/borrow"),
            Some(json!({ "due_date": due })),
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["details"]["due_date"].is_array());
    assert!(app.book_available(book).await, "refused borrow must not touch the book");
}

#[tokio::test]
async fn test_borrow_unavailable_book_is_refused() {
    let Some(app) = TestApp::new().await else { return };
    let first = app.create_user("borrower").await;
    let second = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    app.borrow(first, book).await;

    let response = app
        .request("POST", &format!("/api/books/{book}/borrow"), None, Some(second))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["message"],
        "This book is not available for borrowing."
    );
}

#[tokio::test]
async fn test_sixth_borrow_exceeds_limit() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let author = app.create_author().await;
    let category = app.create_category().await;

    for _ in 0..5 {
        let book = app.create_book(author, category).await;
        app.borrow(user, book).await;
    }

    let sixth = app.create_book(author, category).await;
    let response = app
        .request("POST", &format!("/api/books/{sixth}/borrow"), None, Some(user))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["message"],
        "You have reached the maximum number of borrowed books (5)."
    );
    assert!(app.book_available(sixth).await);

    let profile = app.request("GET", "/api/users/me", None, Some(user)).await;
    assert_eq!(profile.data()["active_loans"], 5);
    assert_eq!(profile.data()["can_borrow"], false);
}

#[tokio::test]
async fn test_limit_is_checked_before_availability() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let other = app.create_user("borrower").await;
    let author = app.create_author().await;
    let category = app.create_category().await;

    for _ in 0..5 {
        let book = app.create_book(author, category).await;
        app.borrow(user, book).await;
    }
    let taken = app.create_book(author, category).await;
    app.borrow(other, taken).await;

    let response = app
        .request("POST", &format!("/api/books/{taken}/borrow"), None, Some(user))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        response.body["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("You have reached the maximum")
    );
}

#[tokio::test]
async fn test_borrow_unknown_book_is_not_found() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;

    let response = app
        .request(
            "POST",
            &format!("/api/books/{}/borrow", uuid::Uuid::new_v4()),
            None,
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_return_restores_availability_and_second_return_is_not_found() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    let loan = app.borrow(user, book).await;

    app.advance(Duration::days(3));
    let response = app
        .request("PATCH", &format!("/api/loans/{loan}/return"), None, Some(user))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["status"], "returned");
    assert_eq!(timestamp(&response.data()["returned_at"]), app.clock_now());
    assert!(app.book_available(book).await);

    let again = app
        .request("PATCH", &format!("/api/loans/{loan}/return"), None, Some(user))
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert!(app.book_available(book).await);
}

#[tokio::test]
async fn test_return_by_book_closes_current_loan() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    let loan = app.borrow(user, book).await;

    let response = app
        .request("PATCH", &format!("/api/books/{book}/return_book"), None, Some(user))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["id"], loan.to_string());
    assert!(app.book_available(book).await);

    let none_left = app
        .request("PATCH", &format!("/api/books/{book}/return_book"), None, Some(user))
        .await;
    assert_eq!(none_left.status, StatusCode::NOT_FOUND);
    assert_eq!(none_left.body["message"], "No active loan found");
}

#[tokio::test]
async fn test_returned_book_can_be_borrowed_again() {
    let Some(app) = TestApp::new().await else { return };
    let first = app.create_user("borrower").await;
    let second = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;

    let loan = app.borrow(first, book).await;
    app.request("PATCH", &format!("/api/loans/{loan}/return"), None, Some(first))
        .await;

    app.borrow(second, book).await;
    assert!(!app.book_available(book).await);
}

#[tokio::test]
async fn test_only_owner_or_staff_may_return() {
    let Some(app) = TestApp::new().await else { return };
    let owner = app.create_user("borrower").await;
    let stranger = app.create_user("borrower").await;
    let librarian = app.create_user("librarian").await;
    let book = app.create_standalone_book().await;
    let loan = app.borrow(owner, book).await;

    let refused = app
        .request("PATCH", &format!("/api/loans/{loan}/return"), None, Some(stranger))
        .await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
    assert!(!app.book_available(book).await);

    let accepted = app
        .request("PATCH", &format!("/api/loans/{loan}/return"), None, Some(librarian))
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert!(app.book_available(book).await);
}

#[tokio::test]
async fn test_overdue_loan_is_listed_with_days_overdue() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    let loan = app.borrow(user, book).await;

    app.advance(Duration::days(20));

    let overdue = app
        .request("GET", "/api/loans?filter=overdue", None, Some(user))
        .await;
    assert_eq!(overdue.status, StatusCode::OK);
    let items = overdue.data()["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], loan.to_string());
    assert_eq!(items[0]["status"], "overdue");
    assert_eq!(items[0]["days_overdue"], 6);

    // Overdue loans are still unreturned, so they count as active.
    let active = app
        .request("GET", "/api/loans?filter=active", None, Some(user))
        .await;
    assert_eq!(active.data()["total_items"], 1);

    let returned = app
        .request("GET", "/api/loans?filter=returned", None, Some(user))
        .await;
    assert_eq!(returned.data()["total_items"], 0);

    let profile = app.request("GET", "/api/users/me", None, Some(user)).await;
    assert_eq!(profile.data()["overdue_loans"], 1);
}

#[tokio::test]
async fn test_invalid_loan_filter_is_rejected() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;

    let response = app
        .request("GET", "/api/loans?filter=lost", None, Some(user))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_borrowers_see_only_their_own_loans() {
    let Some(app) = TestApp::new().await else { return };
    let owner = app.create_user("borrower").await;
    let other = app.create_user("borrower").await;
    let librarian = app.create_user("librarian").await;
    let book = app.create_standalone_book().await;
    let loan = app.borrow(owner, book).await;

    let hidden = app
        .request("GET", &format!("/api/loans/{loan}"), None, Some(other))
        .await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let scoped = app
        .request("GET", "/api/loans?scope=all", None, Some(other))
        .await;
    assert_eq!(scoped.data()["total_items"], 0);

    let visible = app
        .request("GET", &format!("/api/loans/{loan}"), None, Some(librarian))
        .await;
    assert_eq!(visible.status, StatusCode::OK);
    assert_eq!(visible.data()["user_id"], owner.to_string());
}

#[tokio::test]
async fn test_requests_without_identity_are_unauthorized() {
    let Some(app) = TestApp::new().await else { return };

    let missing = app.request("GET", "/api/loans", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let unknown = app
        .request("GET", "/api/loans", None, Some(uuid::Uuid::new_v4()))
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_database_rejects_second_active_loan_for_book() {
    let Some(app) = TestApp::new().await else { return };
    let first = app.create_user("borrower").await;
    let second = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    app.borrow(first, book).await;

    let now = app.clock_now();
    let result = sqlx::query(
        r#"INSERT INTO loans (user_id, book_id, borrowed_at, due_date)
           VALUES ($1, $2, $3, $4)"#,
    )
    .bind(second)
    .bind(book)
    .bind(now)
    .bind(now + Duration::days(14))
    .execute(&app.db_pool)
    .await;

    let err = result.expect_err("second active loan must violate the partial index");
    let constraint = err
        .as_database_error()
        .and_then(|e| e.constraint())
        .map(str::to_string);
    assert_eq!(constraint.as_deref(), Some("loans_one_active_per_book"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_borrows_of_one_book_admit_one() {
    let Some(app) = TestApp::new().await else { return };
    let book = app.create_standalone_book().await;
    let mut users = Vec::new();
    for _ in 0..10 {
        users.push(app.create_user("borrower").await);
    }

    let path = format!("/api/books/{book}/borrow");
    let handles: Vec<_> = users
        .into_iter()
        .map(|user| {
            let router = app.router.clone();
            let path = path.clone();
            tokio::spawn(async move { send(router, "POST", &path, None, Some(user)).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let response = handle.await.expect("borrow task panicked");
        match response.status {
            StatusCode::CREATED => created += 1,
            StatusCode::UNPROCESSABLE_ENTITY => {}
            other => panic!("unexpected status {other}: {:?}", response.body),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(app.active_loans_for_book(book).await, 1);
    assert!(!app.book_available(book).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_borrows_by_one_user_stop_at_limit() {
    let Some(app) = TestApp::new().await else { return };
    let user = app.create_user("borrower").await;
    let author = app.create_author().await;
    let category = app.create_category().await;
    let mut books = Vec::new();
    for _ in 0..10 {
        books.push(app.create_book(author, category).await);
    }

    let handles: Vec<_> = books
        .iter()
        .map(|book| {
            let router = app.router.clone();
            let path = format!("/api/books/{book}/borrow");
            tokio::spawn(async move { send(router, "POST", &path, None, Some(user)).await })
        })
        .collect();

    let (mut created, mut refused) = (0, 0);
    for handle in handles {
        let response = handle.await.expect("borrow task panicked");
        match response.status {
            StatusCode::CREATED => created += 1,
            StatusCode::UNPROCESSABLE_ENTITY => refused += 1,
            other => panic!("unexpected status {other}: {:?}", response.body),
        }
    }

    assert_eq!((created, refused), (5, 5));
    assert_eq!(app.active_loans_for_user(user).await, 5);

    let mut still_available = 0;
    for book in books {
        if app.book_available(book).await {
            still_available += 1;
        }
    }
    assert_eq!(still_available, 5);
}
