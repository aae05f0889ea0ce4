/// Invite issuance, redemption, and QR resolution
///
/// This module is the single authorized entry point per invite operation.
/// There is no secondary read path to invite records and no other caller
/// of the store's consume operation.
///
/// # Redemption
///
/// `redeem` performs, in order:
///
/// 1. A read-only lookup to reject self-redemption before any mutation
/// 2. The store's one atomic conditional update ([`InviteCode::consume`]),
///    whose guard encodes both the usage cap and the expiry check
/// 3. On a guard miss, a diagnostics-only re-read to classify the failure
///    (not found / expired / exhausted) for the error message. That read
///    never decides whether to mutate.
///
/// # Retry policy
///
/// Validation failures are deterministic and never retried. Pool
/// acquisition timeouts are retried with bounded backoff because the
/// statement provably never reached the server; any other connectivity
/// failure surfaces as [`InviteError::Transient`] and the caller re-checks
/// state rather than blindly re-incrementing. A code generation collision
/// is retried up to [`MAX_CODE_GENERATION_ATTEMPTS`] times, after which it
/// is an infrastructure fault ([`InviteError::Conflict`]), not a
/// user-facing validation failure.
///
/// # Example
///
/// ```no_run
/// use stridelink_shared::invite::service::InviteService;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, creator: Uuid, friend: Uuid) -> anyhow::Result<()> {
/// let invites = InviteService::new(pool);
///
/// let invite = invites.create(creator, None, Some(5)).await?;
/// let inviter = invites.redeem(&invite.code, friend).await?;
/// assert_eq!(inviter, creator);
/// # Ok(())
/// # }
/// ```

use crate::invite::code;
use crate::models::invite_code::{CreateInviteCode, InviteCode, InviteStatus};
use crate::models::user_directory::UserDirectory;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Upper bound on regenerate-and-retry for code collisions
///
/// At 16 random bytes a collision should never happen in practice;
/// exceeding this bound indicates something is wrong with the entropy
/// source or the store.
pub const MAX_CODE_GENERATION_ATTEMPTS: u32 = 5;

/// Attempts for store calls that fail before reaching the server
const MAX_TRANSIENT_ATTEMPTS: u32 = 3;

/// Base backoff delay between transient retries (doubles per attempt)
const RETRY_BASE_DELAY_MS: u64 = 50;

/// Error taxonomy for invite operations
///
/// Validation-category errors (`NotFound`, `Expired`, `UsageExhausted`,
/// `SelfReferential`, `Unauthenticated`, `Unauthorized`) are deterministic
/// and must not be retried. `Transient` is retryable by the caller;
/// `Conflict` and `Store` are infrastructure faults.
#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    /// Code or identifier unknown
    #[error("invite code or identifier not found")]
    NotFound,

    /// Code's expiry instant has passed
    #[error("invite code has expired")]
    Expired,

    /// Code's usage budget is fully consumed
    #[error("invite code has no remaining uses")]
    UsageExhausted,

    /// Requester is the creator/owner of the code or QR identity
    #[error("cannot redeem your own invite")]
    SelfReferential,

    /// No authenticated session established
    #[error("request is not authenticated")]
    Unauthenticated,

    /// Claimed requester identity does not match the session
    #[error("requester identity does not match the authenticated session")]
    Unauthorized,

    /// Code generation collided past the retry budget
    #[error("could not issue a unique invite code after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// Store unavailable; safe for the caller to retry with backoff
    #[error("invite store unavailable: {0}")]
    Transient(#[source] sqlx::Error),

    /// Non-retryable store failure
    #[error("invite store error: {0}")]
    Store(#[source] sqlx::Error),
}

impl InviteError {
    /// Checks whether this is a deterministic validation failure
    ///
    /// Validation failures describe the request, not the system; retrying
    /// them cannot change the outcome.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            InviteError::NotFound
                | InviteError::Expired
                | InviteError::UsageExhausted
                | InviteError::SelfReferential
                | InviteError::Unauthenticated
                | InviteError::Unauthorized
        )
    }

    /// Checks whether the caller may retry the operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, InviteError::Transient(_))
    }
}

/// Invite issuance and redemption service
///
/// Owns every mutation of invite state. Cheap to clone; handlers hold it
/// in shared application state.
#[derive(Clone)]
pub struct InviteService {
    db: PgPool,
}

impl InviteService {
    /// Creates a new invite service over a connection pool
    pub fn new(db: PgPool) -> Self {
        InviteService { db }
    }

    /// Issues a new invite code for a user
    ///
    /// # Arguments
    ///
    /// * `creator_user_id` - User issuing the code (existence verified)
    /// * `expires_at` - Optional expiry instant; None = never expires
    /// * `max_usages` - Optional usage cap; None = unlimited
    ///
    /// # Errors
    ///
    /// - [`InviteError::NotFound`] if the creator does not exist
    /// - [`InviteError::Conflict`] if code generation keeps colliding
    /// - [`InviteError::Transient`] if the store is unavailable
    pub async fn create(
        &self,
        creator_user_id: Uuid,
        expires_at: Option<DateTime<Utc>>,
        max_usages: Option<i32>,
    ) -> Result<InviteCode, InviteError> {
        self.create_with_generator(creator_user_id, expires_at, max_usages, code::generate)
            .await
    }

    /// Variant of [`create`](Self::create) that takes the code generator
    /// as a closure
    ///
    /// The store, not the generator, enforces uniqueness: on a unique
    /// constraint violation for `code` the generator is invoked again, up
    /// to [`MAX_CODE_GENERATION_ATTEMPTS`] times.
    pub async fn create_with_generator(
        &self,
        creator_user_id: Uuid,
        expires_at: Option<DateTime<Utc>>,
        max_usages: Option<i32>,
        mut generate: impl FnMut() -> String,
    ) -> Result<InviteCode, InviteError> {
        let creator_exists = with_retries("invite.create.exists", || {
            UserDirectory::exists(&self.db, creator_user_id)
        })
        .await?;

        if !creator_exists {
            return Err(InviteError::NotFound);
        }

        for attempt in 1..=MAX_CODE_GENERATION_ATTEMPTS {
            let code = generate();

            let result = with_retries("invite.create.insert", || {
                InviteCode::create(
                    &self.db,
                    CreateInviteCode {
                        code: code.clone(),
                        creator_user_id,
                        expires_at,
                        max_usages,
                    },
                )
            })
            .await;

            match result {
                Ok(invite) => {
                    info!(
                        invite_id = %invite.id,
                        creator = %creator_user_id,
                        max_usages = ?max_usages,
                        expires_at = ?expires_at,
                        "Issued invite code"
                    );
                    return Ok(invite);
                }
                Err(InviteError::Store(ref e)) if is_code_collision(e) => {
                    warn!(attempt, "Invite code collision, regenerating");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(InviteError::Conflict {
            attempts: MAX_CODE_GENERATION_ATTEMPTS,
        })
    }

    /// Redeems an invite code, consuming one unit of its usage budget
    ///
    /// # Arguments
    ///
    /// * `code` - The code string being redeemed
    /// * `requester_user_id` - Authenticated user redeeming the code
    ///
    /// # Returns
    ///
    /// The inviter's user ID. Friend-relationship creation is a separate,
    /// idempotent follow-up owned by the caller; redemption does not wrap
    /// it in a transaction.
    ///
    /// # Errors
    ///
    /// - [`InviteError::NotFound`] if no such code exists
    /// - [`InviteError::SelfReferential`] if the requester created the code
    /// - [`InviteError::Expired`] / [`InviteError::UsageExhausted`] if the
    ///   code is in a terminal state; no mutation occurs
    /// - [`InviteError::Transient`] if the store is unavailable
    pub async fn redeem(&self, code: &str, requester_user_id: Uuid) -> Result<Uuid, InviteError> {
        // Self-redemption is a degenerate case; reject it before the
        // atomic transition. creator_user_id is immutable, so this read
        // cannot race with the consume below.
        let invite = with_retries("invite.redeem.lookup", || {
            InviteCode::find_by_code(&self.db, code)
        })
        .await?
        .ok_or(InviteError::NotFound)?;

        if invite.creator_user_id == requester_user_id {
            return Err(InviteError::SelfReferential);
        }

        // The one atomic conditional state transition. Either exactly one
        // usage unit is consumed while the guard holds, or nothing changes.
        let consumed = with_retries("invite.redeem.consume", || {
            InviteCode::consume(&self.db, code)
        })
        .await?;

        if let Some(inviter_user_id) = consumed {
            info!(
                code_id = %invite.id,
                inviter = %inviter_user_id,
                requester = %requester_user_id,
                "Invite code redeemed"
            );
            return Ok(inviter_user_id);
        }

        // Guard miss: re-read purely to say why. This snapshot is
        // diagnostics only and never drives a mutation.
        let snapshot = with_retries("invite.redeem.classify", || {
            InviteCode::find_by_code(&self.db, code)
        })
        .await?;

        Err(classify_consume_miss(snapshot.as_ref(), Utc::now()))
    }

    /// Resolves a permanent QR identity to its owning user
    ///
    /// No mutation, no usage accounting.
    ///
    /// # Errors
    ///
    /// - [`InviteError::NotFound`] if no user owns the identifier
    /// - [`InviteError::SelfReferential`] if the requester scanned their
    ///   own QR identity
    pub async fn resolve_qr(
        &self,
        qr_code_id: &str,
        requester_user_id: Uuid,
    ) -> Result<Uuid, InviteError> {
        let owner = with_retries("invite.qr.resolve", || {
            UserDirectory::id_for_qr(&self.db, qr_code_id)
        })
        .await?
        .ok_or(InviteError::NotFound)?;

        if owner == requester_user_id {
            return Err(InviteError::SelfReferential);
        }

        Ok(owner)
    }
}

/// Classifies a consume miss from a diagnostics snapshot
///
/// The guard and the snapshot are separate observations, so near the
/// expiry boundary they can disagree; when the code carries an expiry,
/// prefer `Expired` over `UsageExhausted`.
fn classify_consume_miss(invite: Option<&InviteCode>, now: DateTime<Utc>) -> InviteError {
    match invite {
        None => InviteError::NotFound,
        Some(invite) => match invite.status_at(now) {
            InviteStatus::Expired => InviteError::Expired,
            InviteStatus::Exhausted => InviteError::UsageExhausted,
            InviteStatus::Active => {
                if invite.expires_at.is_some() {
                    InviteError::Expired
                } else {
                    InviteError::UsageExhausted
                }
            }
        },
    }
}

/// Checks for a unique constraint violation on the code column
fn is_code_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some("invite_codes_code_key"),
        _ => false,
    }
}

/// Checks whether a store failure provably occurred before the statement
/// reached the server, making an automatic retry safe for any operation
fn failed_before_send(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::PoolTimedOut)
}

/// Maps a store error to the invite taxonomy
fn map_store_error(err: sqlx::Error) -> InviteError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            InviteError::Transient(err)
        }
        _ => InviteError::Store(err),
    }
}

/// Runs a store call, retrying pre-send failures with bounded backoff
async fn with_retries<T, F, Fut>(op_name: &str, mut op: F) -> Result<T, InviteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if failed_before_send(&e) && attempt + 1 < MAX_TRANSIENT_ATTEMPTS => {
                attempt += 1;
                warn!(
                    op = op_name,
                    attempt,
                    error = %e,
                    "Transient store failure, retrying"
                );
                tokio::time::sleep(Duration::from_millis(RETRY_BASE_DELAY_MS << attempt)).await;
            }
            Err(e) => return Err(map_store_error(e)),
        }
    }
}
