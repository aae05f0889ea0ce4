/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `invites`: Invite creation, listing, and redemption
/// - `qr`: QR identity resolution

pub mod health;
pub mod invites;
pub mod qr;
