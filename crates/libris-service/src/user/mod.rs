//! User lookups and profiles.

pub mod service;

pub use service::{UserProfile, UserService};
