//! # libris-auth
//!
//! Authorization for Libris. Identity is asserted by the gateway in front
//! of the service; this crate only decides what an identified user's role
//! allows.
//!
//! ## Modules
//!
//! - `rbac`: role-to-permission policies and their enforcement

pub mod rbac;

pub use rbac::{RbacEnforcer, RbacPolicies, SystemPermission};
