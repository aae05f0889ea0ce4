//! # Stridelink Shared Library
//!
//! Shared types and business logic for the Stridelink invite service.
//! The API server consumes this crate; no other component writes invite
//! state.
//!
//! ## Module Organization
//!
//! - `db`: PostgreSQL connection pool and migration runner
//! - `models`: Database models (`invite_code`, `user_directory`)
//! - `invite`: Invite domain logic (code generation, redemption,
//!   QR resolution, deep link formatting)
//! - `auth`: JWT session tokens, axum middleware, requester gate

pub mod auth;
pub mod db;
pub mod invite;
pub mod models;

/// Current version of the Stridelink shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
