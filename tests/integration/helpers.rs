//! Shared test helpers for integration tests.
//!
//! Tests talk to a real PostgreSQL database named by
//! `LIBRIS_TEST_DATABASE_URL`. When it is unset, [`TestApp::new`] returns
//! `None` and the test returns early.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{DateTime, Duration, TimeZone, Utc};
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use libris_core::config::AppConfig;
use libris_core::traits::{Clock, ManualClock};
use libris_database::DatabasePool;

/// Environment variable naming the test database.
pub const DATABASE_URL_ENV: &str = "LIBRIS_TEST_DATABASE_URL";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Clock shared with every service
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Create a new test application, or `None` without a test database.
    ///
    /// Every test seeds its own users and books with unique keys, so tests
    /// can share one database and run concurrently.
    pub async fn new() -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
            eprintln!("{DATABASE_URL_ENV} not set; skipping");
            return None;
        };

        let mut config = AppConfig::with_database_url(url);
        config.database.max_connections = 10;
        config.database.min_connections = 0;

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        libris_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let db_pool = db.pool().clone();
        let clock = Arc::new(ManualClock::new(start_instant()));
        let state = libris_api::build_state(config, db, clock.clone())
            .expect("Failed to build application state");

        Some(Self {
            router: libris_api::build_app(state),
            db_pool,
            clock,
        })
    }

    /// The instant every service currently sees.
    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Move the shared clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Create a user with `role` and return their id.
    pub async fn create_user(&self, role: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO users (id, email, name, role)
               VALUES ($1, $2, $3, $4::user_role)"#,
        )
        .bind(id)
        .bind(format!("{id}@libris.test"))
        .bind(format!("Test {role}"))
        .bind(role)
        .execute(&self.db_pool)
        .await
        .expect("Failed to create test user");
        id
    }

    /// Create an author and return its id.
    pub async fn create_author(&self) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO authors (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(format!("Author {}", short(id)))
            .execute(&self.db_pool)
            .await
            .expect("Failed to create author");
        id
    }

    /// Create a category with a unique name and return its id.
    pub async fn create_category(&self) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(format!("Category {}", short(id)))
            .execute(&self.db_pool)
            .await
            .expect("Failed to create category");
        id
    }

    /// Create an available book under `author_id` and `category_id`.
    pub async fn create_book(&self, author_id: Uuid, category_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO books (id, title, isbn, author_id, category_id)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(id)
        .bind(format!("Book {}", short(id)))
        .bind(unique_isbn())
        .bind(author_id)
        .bind(category_id)
        .execute(&self.db_pool)
        .await
        .expect("Failed to create book");
        id
    }

    /// Create an available book with a fresh author and category.
    pub async fn create_standalone_book(&self) -> Uuid {
        let author_id = self.create_author().await;
        let category_id = self.create_category().await;
        self.create_book(author_id, category_id).await
    }

    /// The stored `available` flag of a book.
    pub async fn book_available(&self, book_id: Uuid) -> bool {
        sqlx::query_scalar("SELECT available FROM books WHERE id = $1")
            .bind(book_id)
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to read book")
    }

    /// Borrow `book_id` as `user_id`, asserting success, and return the loan id.
    pub async fn borrow(&self, user_id: Uuid, book_id: Uuid) -> Uuid {
        let response = self
            .request("POST", &format!("/api/books/{book_id}/borrow"), None, Some(user_id))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Borrow failed: {:?}",
            response.body
        );
        response.data()["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("No loan id in borrow response")
    }

    /// Make an HTTP request to the test app, identified as `user`.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<Uuid>,
    ) -> TestResponse {
        send(self.router.clone(), method, path, body, user).await
    }

    /// Number of unreturned loans for a book.
    pub async fn active_loans_for_book(&self, book_id: Uuid) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE book_id = $1 AND returned_at IS NULL",
        )
        .bind(book_id)
        .fetch_one(&self.db_pool)
        .await
        .expect("Failed to count loans")
    }

    /// Number of unreturned loans held by a user.
    pub async fn active_loans_for_user(&self, user_id: Uuid) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND returned_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await
        .expect("Failed to count loans")
    }
}

/// Send one request through `router`. Owns its router so it can run on a
/// spawned task.
pub async fn send(
    router: Router,
    method: &str,
    path: &str,
    body: Option<Value>,
    user: Option<Uuid>,
) -> TestResponse {
    let mut req = Request::builder().method(method).uri(path);

    // Bodyless requests carry no content type, like a plain `curl -X POST`.
    let body_str = match body {
        Some(b) => {
            req = req.header("Content-Type", "application/json");
            serde_json::to_string(&b).expect("Failed to serialize body")
        }
        None => String::new(),
    };

    if let Some(user) = user {
        req = req.header("X-User-Id", user.to_string());
    }

    let req = req
        .body(Body::from(body_str))
        .expect("Failed to build request");

    let response = router
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");

    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    TestResponse { status, body }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// Fixed start instant for the manual clock.
pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid start instant")
}

/// A 13-digit ISBN-like string unique enough for one test run.
pub fn unique_isbn() -> String {
    let digits: String = Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .take(10)
        .collect();
    format!("978{digits}")
}

fn short(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
