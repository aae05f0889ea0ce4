/// Read-only directory lookups over user records
///
/// User profiles are owned by the profile service; this service only
/// consumes two lookups from them: existence checks and QR identity
/// resolution. Nothing here writes the users table.
///
/// # Schema (owned elsewhere)
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     display_name VARCHAR(255),
///     qr_code_id VARCHAR(32) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `qr_code_id` is assigned once at profile creation, never reused, never
/// expires, and is never usage-counted.

use sqlx::PgPool;
use uuid::Uuid;

/// Read-only lookups the invite service consumes from user records
pub struct UserDirectory;

impl UserDirectory {
    /// Checks whether a user exists
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn exists(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Resolves a permanent QR identifier to its owning user
    ///
    /// No mutation, no usage accounting.
    ///
    /// # Returns
    ///
    /// The owner's user ID, or None if no user owns that identifier
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn id_for_qr(pool: &PgPool, qr_code_id: &str) -> Result<Option<Uuid>, sqlx::Error> {
        let owner: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE qr_code_id = $1")
                .bind(qr_code_id)
                .fetch_optional(pool)
                .await?;

        Ok(owner.map(|(id,)| id))
    }

    /// Looks up a user's own QR identifier
    ///
    /// Used by the "show my QR" surface to render the user's permanent
    /// deep link.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn qr_for_user(pool: &PgPool, user_id: Uuid) -> Result<Option<String>, sqlx::Error> {
        let qr: Option<(String,)> =
            sqlx::query_as("SELECT qr_code_id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;

        Ok(qr.map(|(id,)| id))
    }
}
