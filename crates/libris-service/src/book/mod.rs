//! Catalogue management for books.

pub mod service;

pub use service::{BookService, BookView};
