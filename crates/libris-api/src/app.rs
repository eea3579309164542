//! Application builder: wires repositories, services and middleware into
//! an Axum app, and runs it.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::info;

use libris_auth::rbac::RbacEnforcer;
use libris_core::config::AppConfig;
use libris_core::error::AppError;
use libris_core::traits::Clock;
use libris_database::DatabasePool;
use libris_database::repositories::{
    AuthorRepository, BookRepository, CategoryRepository, LoanRepository, UserRepository,
};
use libris_entity::loan::BorrowingPolicy;
use libris_service::{
    AuthorService, BookService, CategoryService, DashboardService, LoanService, UserService,
};

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::timeout::build_timeout_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Construct every repository and service over `db`.
pub fn build_state(
    config: AppConfig,
    db: DatabasePool,
    clock: Arc<dyn Clock>,
) -> Result<AppState, AppError> {
    let policy = BorrowingPolicy::from_config(&config.lending)?;
    info!(
        max_active_loans = policy.max_active_loans,
        loan_duration_days = policy.loan_duration.num_days(),
        "Borrowing policy loaded"
    );

    let pool = db.pool().clone();
    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let book_repo = Arc::new(BookRepository::new(pool.clone()));
    let author_repo = Arc::new(AuthorRepository::new(pool.clone()));
    let category_repo = Arc::new(CategoryRepository::new(pool.clone()));
    let loan_repo = Arc::new(LoanRepository::new(pool));

    let rbac = Arc::new(RbacEnforcer::new());

    let loan_service = Arc::new(LoanService::new(
        Arc::clone(&loan_repo),
        Arc::clone(&rbac),
        policy,
        Arc::clone(&clock),
    ));
    let book_service = Arc::new(BookService::new(
        Arc::clone(&book_repo),
        Arc::clone(&loan_repo),
        Arc::clone(&rbac),
        Arc::clone(&clock),
    ));
    let author_service = Arc::new(AuthorService::new(
        Arc::clone(&author_repo),
        Arc::clone(&rbac),
    ));
    let category_service = Arc::new(CategoryService::new(
        Arc::clone(&category_repo),
        Arc::clone(&rbac),
    ));
    let dashboard_service = Arc::new(DashboardService::new(
        Arc::clone(&book_repo),
        Arc::clone(&loan_repo),
        Arc::clone(&user_repo),
        Arc::clone(&author_repo),
        Arc::clone(&category_repo),
        Arc::clone(&rbac),
        Arc::clone(&clock),
    ));
    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repo),
        Arc::clone(&loan_repo),
        policy,
        Arc::clone(&clock),
    ));

    Ok(AppState {
        config: Arc::new(config),
        db,
        clock,
        loan_service,
        book_service,
        author_service,
        category_service,
        dashboard_service,
        user_service,
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    let timeout = build_timeout_layer(Duration::from_secs(
        state.config.server.request_timeout_seconds,
    ));

    build_router(state)
        .layer(build_compression_layer())
        .layer(cors)
        .layer(timeout)
}

/// Serve the API until Ctrl+C or SIGTERM.
pub async fn run_server(state: AppState) -> Result<(), AppError> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let db = state.db.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "Libris server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    info!("Libris server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
