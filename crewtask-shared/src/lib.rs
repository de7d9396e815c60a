//! # Crewtask Shared Library
//!
//! This crate contains the models, persistence layer, and authentication /
//! authorization logic shared by the crewtask API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, sessions, and the membership authority
//! - `db`: Connection pool and migrations
//! - `redis`: Redis client backing the session store

pub mod auth;
pub mod db;
pub mod models;
pub mod redis;

/// Current version of the crewtask shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
