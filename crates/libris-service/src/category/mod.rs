//! Catalogue management for categories.

pub mod service;

pub use service::CategoryService;
