//! Catalogue management for authors.

pub mod service;

pub use service::AuthorService;
