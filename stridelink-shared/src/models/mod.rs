/// Database models for Stridelink
///
/// This module contains the database models owned by the invite service
/// and the read-only directory view over user records.
///
/// # Models
///
/// - `invite_code`: Issued invite codes and the atomic consume operation
/// - `user_directory`: Read-only lookups over user records (QR identity,
///   existence checks)
///
/// # Example
///
/// ```no_run
/// use stridelink_shared::models::invite_code::{CreateInviteCode, InviteCode};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, creator: Uuid) -> Result<(), sqlx::Error> {
/// let invite = InviteCode::create(&pool, CreateInviteCode {
///     code: "ucXKeBTSLkyVZJWVnOYCWg".to_string(),
///     creator_user_id: creator,
///     expires_at: None,
///     max_usages: Some(5),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod invite_code;
pub mod user_directory;
