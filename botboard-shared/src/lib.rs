//! # Botboard Shared Library
//!
//! Shared types and logic used by the Botboard API server: authentication
//! primitives, the PostgreSQL layer, entity models with their reporting
//! queries, and date-range filter construction.
//!
//! ## Module Organization
//!
//! - `auth`: JWT tokens and Argon2 password hashing for the single admin
//! - `db`: Connection pool and embedded migrations
//! - `filters`: Date-range and pagination parsing shared by the report queries
//! - `models`: Entity models (users, conversations, messages, menu events,
//!   raw events) and the aggregate SQL behind each report

pub mod auth;
pub mod db;
pub mod filters;
pub mod models;

/// Current version of the Botboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
