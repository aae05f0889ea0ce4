/// Authentication and authorization utilities
///
/// This module provides the session primitives the invite service relies
/// on:
///
/// # Modules
///
/// - [`jwt`]: JWT token generation and validation (HS256)
/// - [`middleware`]: axum middleware extracting an [`middleware::AuthContext`]
///   from the Authorization header
/// - [`gate`]: requester identity gate; every entry point that accepts a
///   requester/creator user ID verifies it against the session before
///   doing any work
///
/// Token issuance (login, refresh) lives in the identity service; this
/// crate only mints tokens in tests and validates them in production.

pub mod gate;
pub mod jwt;
pub mod middleware;
