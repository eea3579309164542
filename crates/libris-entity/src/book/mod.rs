//! Book domain entities.

pub mod model;

pub use model::{Book, BookDetails, BookFilter, CreateBook, UpdateBook};
