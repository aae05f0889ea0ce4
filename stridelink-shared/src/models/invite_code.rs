/// Invite code model and database operations
///
/// This module provides the InviteCode model and the one code path allowed
/// to mutate `usage_count`: the conditional [`InviteCode::consume`] update.
///
/// # State Machine
///
/// A code's state is derived from its stored fields at read time, never
/// stored:
///
/// ```text
/// Active    = (max_usages unset OR usage_count < max_usages)
///             AND (expires_at unset OR now < expires_at)
/// Exhausted = usage_count >= max_usages          (terminal)
/// Expired   = now >= expires_at                  (terminal)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE invite_codes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     code VARCHAR(64) NOT NULL UNIQUE,
///     creator_user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ,
///     max_usages INTEGER CHECK (max_usages > 0),
///     usage_count INTEGER NOT NULL DEFAULT 0 CHECK (usage_count >= 0)
/// );
/// ```
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
///     max_usages: Some(1),
/// }).await?;
///
/// // Atomically consume one usage unit
/// if let Some(inviter) = InviteCode::consume(&pool, &invite.code).await? {
///     println!("Redeemed invite from {}", inviter);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Derived lifecycle state of an invite code at an observation instant
///
/// Terminal states (`Expired`, `Exhausted`) reject redemption without
/// mutation; a code never transitions back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    /// Code can still be redeemed
    Active,

    /// Code's expiry instant has passed
    Expired,

    /// Code's usage budget is fully consumed
    Exhausted,
}

impl InviteStatus {
    /// Converts status to string for responses and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Active => "active",
            InviteStatus::Expired => "expired",
            InviteStatus::Exhausted => "exhausted",
        }
    }

    /// Checks if the status is terminal for redemption
    pub fn is_terminal(&self) -> bool {
        matches!(self, InviteStatus::Expired | InviteStatus::Exhausted)
    }
}

/// Invite code model representing one issued shareable code
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InviteCode {
    /// Unique row ID
    pub id: Uuid,

    /// URL-safe code string (base64url of 16 random bytes), globally unique
    pub code: String,

    /// User who issued the code
    pub creator_user_id: Uuid,

    /// When the code was issued
    pub created_at: DateTime<Utc>,

    /// Expiry instant (None = never expires by time)
    pub expires_at: Option<DateTime<Utc>>,

    /// Usage cap (None = unlimited uses)
    pub max_usages: Option<i32>,

    /// Successful redemptions so far, monotonically non-decreasing
    pub usage_count: i32,
}

/// Input for persisting a new invite code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInviteCode {
    /// Generated code string (see `invite::code::generate`)
    pub code: String,

    /// User issuing the code
    pub creator_user_id: Uuid,

    /// Optional expiry instant
    pub expires_at: Option<DateTime<Utc>>,

    /// Optional usage cap (must be positive; enforced by a CHECK constraint)
    pub max_usages: Option<i32>,
}

impl InviteCode {
    /// Derives the code's lifecycle state at `now`
    ///
    /// Pure function of the stored fields. Expiry is checked before the
    /// usage cap so an expired code reports `Expired` even with budget
    /// remaining.
    ///
    /// # Example
    ///
    /// ```
    /// use stridelink_shared::models::invite_code::{InviteCode, InviteStatus};
    /// use chrono::{Duration, Utc};
    /// use uuid::Uuid;
    ///
    /// let now = Utc::now();
    /// let invite = InviteCode {
    ///     id: Uuid::new_v4(),
    ///     code: "ucXKeBTSLkyVZJWVnOYCWg".to_string(),
    ///     creator_user_id: Uuid::new_v4(),
    ///     created_at: now,
    ///     expires_at: Some(now + Duration::hours(1)),
    ///     max_usages: Some(3),
    ///     usage_count: 0,
    /// };
    ///
    /// assert_eq!(invite.status_at(now), InviteStatus::Active);
    /// ```
    pub fn status_at(&self, now: DateTime<Utc>) -> InviteStatus {
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return InviteStatus::Expired;
            }
        }

        if let Some(max_usages) = self.max_usages {
            if self.usage_count >= max_usages {
                return InviteStatus::Exhausted;
            }
        }

        InviteStatus::Active
    }

    /// Persists a new invite code with `usage_count = 0`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The code collides with an existing row (unique constraint
    ///   violation; the service layer regenerates and retries)
    /// - The creator does not exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateInviteCode) -> Result<Self, sqlx::Error> {
        let invite = sqlx::query_as::<_, InviteCode>(
            r#"
            INSERT INTO invite_codes (code, creator_user_id, expires_at, max_usages)
            VALUES ($1, $2, $3, $4)
            RETURNING id, code, creator_user_id, created_at, expires_at,
                      max_usages, usage_count
            "#,
        )
        .bind(data.code)
        .bind(data.creator_user_id)
        .bind(data.expires_at)
        .bind(data.max_usages)
        .fetch_one(pool)
        .await?;

        Ok(invite)
    }

    /// Finds an invite code by its code string
    ///
    /// Read-only. The redeemer uses this for the self-redemption check
    /// before the atomic consume, and again to classify a consume miss;
    /// the result never decides whether to mutate.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Self>, sqlx::Error> {
        let invite = sqlx::query_as::<_, InviteCode>(
            r#"
            SELECT id, code, creator_user_id, created_at, expires_at,
                   max_usages, usage_count
            FROM invite_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(pool)
        .await?;

        Ok(invite)
    }

    /// Lists codes issued by a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list_by_creator(
        pool: &PgPool,
        creator_user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let invites = sqlx::query_as::<_, InviteCode>(
            r#"
            SELECT id, code, creator_user_id, created_at, expires_at,
                   max_usages, usage_count
            FROM invite_codes
            WHERE creator_user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(creator_user_id)
        .fetch_all(pool)
        .await?;

        Ok(invites)
    }

    /// Atomically consumes one unit of a code's usage budget
    ///
    /// This is the single compare-and-swap over invite state: one
    /// conditional UPDATE whose guard clause encodes both the usage cap
    /// and the expiry check. The database applies the increment and the
    /// guard as one indivisible operation, so the cap holds under
    /// concurrent redemption across independent processes. No other code
    /// path writes `usage_count`.
    ///
    /// # Returns
    ///
    /// - `Some(creator_user_id)` if the transition applied (one usage
    ///   unit consumed)
    /// - `None` if the guard did not hold: code unknown, expired, or
    ///   exhausted. Callers classify the cause with a separate
    ///   diagnostics-only read.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails; the row is
    /// unchanged in that case unless the server applied the update before
    /// the failure (callers must re-check state, not re-increment).
    pub async fn consume(pool: &PgPool, code: &str) -> Result<Option<Uuid>, sqlx::Error> {
        let inviter: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE invite_codes
            SET usage_count = usage_count + 1
            WHERE code = $1
              AND (max_usages IS NULL OR usage_count < max_usages)
              AND (expires_at IS NULL OR expires_at > NOW())
            RETURNING creator_user_id
            "#,
        )
        .bind(code)
        .fetch_optional(pool)
        .await?;

        Ok(inviter.map(|(id,)| id))
    }
}
