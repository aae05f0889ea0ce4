/// Invite domain logic
///
/// This module owns the invite code lifecycle:
///
/// - `code`: unguessable, URL-safe code generation
/// - `deeplink`: canonical invitation URI formatting
/// - `service`: issuance with collision retry, atomic redemption, and
///   QR identity resolution, plus the invite error taxonomy
///
/// The service is the only caller of the store's consume operation; the
/// HTTP layer never touches `usage_count` directly.

pub mod code;
pub mod deeplink;
pub mod service;

pub use deeplink::DeepLinkFormatter;
pub use service::{InviteError, InviteService};
