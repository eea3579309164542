//! # libris-api
//!
//! HTTP API layer for Libris built on Axum.
//!
//! Provides the REST endpoints, middleware (CORS, compression, request
//! logging, timeouts), extractors, DTOs, and the mapping from
//! [`AppError`](libris_core::AppError) to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
