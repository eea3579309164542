//! Role-aware dashboard statistics.

pub mod service;

pub use service::{Dashboard, DashboardService, LibraryStats, SystemStats};
