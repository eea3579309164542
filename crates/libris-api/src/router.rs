//! Route definitions for the Libris HTTP API.
//!
//! All routes are organized by resource and mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with every route, request logging and tracing.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(user_routes())
        .merge(book_routes())
        .merge(author_routes())
        .merge(category_routes())
        .merge(loan_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Profile and dashboard
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::user::get_profile))
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
}

/// Catalogue, plus borrow/return addressed by book
fn book_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/books",
            get(handlers::book::list_books).post(handlers::book::create_book),
        )
        .route("/books/validate_isbn", get(handlers::book::validate_isbn))
        .route(
            "/books/{id}",
            get(handlers::book::get_book)
                .put(handlers::book::update_book)
                .delete(handlers::book::delete_book),
        )
        .route("/books/{id}/borrow", post(handlers::book::borrow_book))
        .route("/books/{id}/return_book", patch(handlers::book::return_book))
}

fn author_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/authors",
            get(handlers::author::list_authors).post(handlers::author::create_author),
        )
        .route(
            "/authors/{id}",
            get(handlers::author::get_author)
                .put(handlers::author::update_author)
                .delete(handlers::author::delete_author),
        )
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::category::list_categories).post(handlers::category::create_category),
        )
        .route(
            "/categories/{id}",
            get(handlers::category::get_category)
                .put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
}

/// Loan listing, borrow and return
fn loan_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/loans",
            get(handlers::loan::list_loans).post(handlers::loan::create_loan),
        )
        .route("/loans/{id}", get(handlers::loan::get_loan))
        .route("/loans/{id}/return", patch(handlers::loan::return_loan))
}
