//! # PCPP Shared Library
//!
//! Persistence and authentication code for the PCPP document sharing
//! service, used by the API server and its tests.
//!
//! ## Module Organization
//!
//! - `db`: SQLite pool and embedded migrations
//! - `models`: Users, notes, comments, sessions and stats
//! - `auth`: Password hashing and session tokens

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the PCPP shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
