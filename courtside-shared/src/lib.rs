//! # Courtside Shared Library
//!
//! This crate contains the types, storage operations, and business logic shared
//! by the Courtside API server.
//!
//! ## Module Organization
//!
//! - `models`: MongoDB document models and their collection operations
//! - `pricing`: Pricing-rule resolution and reservation quoting
//! - `auth`: Authentication primitives (passwords, JWT, request context)
//! - `db`: Database handle and index management

pub mod auth;
pub mod db;
pub mod models;
pub mod pricing;

/// Current version of the Courtside shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
