//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use libris_core::config::AppConfig;
use libris_core::traits::Clock;
use libris_database::DatabasePool;

use libris_service::{
    AuthorService, BookService, CategoryService, DashboardService, LoanService, UserService,
};

/// Shared state injected into every handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Database pool, used directly by health checks.
    pub db: DatabasePool,
    /// Source of "now".
    pub clock: Arc<dyn Clock>,

    /// Borrow and return.
    pub loan_service: Arc<LoanService>,
    /// Book catalogue.
    pub book_service: Arc<BookService>,
    /// Authors.
    pub author_service: Arc<AuthorService>,
    /// Categories.
    pub category_service: Arc<CategoryService>,
    /// Dashboard aggregation.
    pub dashboard_service: Arc<DashboardService>,
    /// User lookups and profiles.
    pub user_service: Arc<UserService>,
}
