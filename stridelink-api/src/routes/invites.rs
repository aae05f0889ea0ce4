/// Invite management endpoints
///
/// All endpoints require JWT authentication. Requests that name a user
/// (creator or requester) are checked against the session identity
/// before any store access happens.
///
/// # Endpoints
///
/// - `POST /v1/invites` - Create an invite code
/// - `GET /v1/invites` - List the caller's invite codes
/// - `POST /v1/invites/redeem` - Redeem an invite code

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use stridelink_shared::{auth::gate, auth::middleware::AuthContext, models::invite_code::InviteCode};
use uuid::Uuid;
use validator::Validate;

/// Create invite request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInviteRequest {
    /// User the invite is created on behalf of
    ///
    /// Must match the authenticated session identity.
    pub creator_user_id: Uuid,

    /// Optional lifetime in seconds, measured from now
    ///
    /// Omit for a code that never expires.
    #[validate(range(min = 1, message = "Lifetime must be at least 1 second"))]
    pub expires_in_seconds: Option<i64>,

    /// Optional usage cap
    ///
    /// Omit for an unlimited code.
    #[validate(range(min = 1, message = "Usage cap must be at least 1"))]
    pub max_usages: Option<i32>,
}

/// Create invite response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateInviteResponse {
    /// The generated invite code
    pub code: String,

    /// Shareable deep link for the code
    pub deep_link: String,

    /// Expiration instant, if any
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Usage cap, if any
    pub max_usages: Option<i32>,
}

/// Invite list item
#[derive(Debug, Serialize, Deserialize)]
pub struct InviteListItem {
    /// Invite code
    pub code: String,

    /// Shareable deep link for the code
    pub deep_link: String,

    /// Current status ("active", "expired", or "exhausted")
    pub status: String,

    /// Times the code has been redeemed
    pub usage_count: i32,

    /// Usage cap, if any
    pub max_usages: Option<i32>,

    /// Expiration instant, if any
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Creation instant
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// List invites response
#[derive(Debug, Serialize, Deserialize)]
pub struct ListInvitesResponse {
    /// The caller's invite codes
    pub invites: Vec<InviteListItem>,
}

/// Redeem invite request
#[derive(Debug, Deserialize, Validate)]
pub struct RedeemInviteRequest {
    /// The invite code to redeem
    #[validate(length(min = 1, max = 64, message = "Code must be 1-64 characters"))]
    pub code: String,

    /// User performing the redemption
    ///
    /// Must match the authenticated session identity.
    pub requester_user_id: Uuid,
}

/// Redeem invite response
#[derive(Debug, Serialize, Deserialize)]
pub struct RedeemInviteResponse {
    /// The user who created the redeemed invite
    pub inviter_user_id: Uuid,
}

/// Create invite
///
/// Generates a fresh invite code for the authenticated user and returns
/// it together with its deep link.
///
/// # Endpoint
///
/// ```text
/// POST /v1/invites
/// Authorization: Bearer <jwt_token>
/// Content-Type: application/json
///
/// {
///   "creator_user_id": "uuid",
///   "expires_in_seconds": 604800,
///   "max_usages": 10
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: `creator_user_id` does not match the session
/// - `404 Not Found`: Creator does not exist
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_invite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateInviteRequest>,
) -> ApiResult<Json<CreateInviteResponse>> {
    req.validate()?;

    let creator = gate::verify_requester(&auth, req.creator_user_id)?;

    let expires_at = req
        .expires_in_seconds
        .map(|secs| Utc::now() + Duration::seconds(secs));

    let invite = state.invites.create(creator, expires_at, req.max_usages).await?;

    Ok(Json(CreateInviteResponse {
        deep_link: state.links.format(&invite.code),
        code: invite.code,
        expires_at: invite.expires_at,
        max_usages: invite.max_usages,
    }))
}

/// List invites
///
/// Returns all invite codes created by the authenticated user, newest
/// first, with their derived status.
///
/// # Endpoint
///
/// ```text
/// GET /v1/invites
/// Authorization: Bearer <jwt_token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
pub async fn list_invites(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ListInvitesResponse>> {
    let codes = InviteCode::list_by_creator(&state.db, auth.user_id).await?;

    let now = Utc::now();
    let invites = codes
        .into_iter()
        .map(|invite| InviteListItem {
            deep_link: state.links.format(&invite.code),
            status: invite.status_at(now).as_str().to_string(),
            code: invite.code,
            usage_count: invite.usage_count,
            max_usages: invite.max_usages,
            expires_at: invite.expires_at,
            created_at: invite.created_at,
        })
        .collect();

    Ok(Json(ListInvitesResponse { invites }))
}

/// Redeem invite
///
/// Atomically consumes one usage of the named code and returns the
/// inviter's identity. The caller is expected to follow up with its own
/// idempotent relationship creation.
///
/// # Endpoint
///
/// ```text
/// POST /v1/invites/redeem
/// Authorization: Bearer <jwt_token>
/// Content-Type: application/json
///
/// {
///   "code": "hXp3vR9qLm2sWt8kYb5cNw",
///   "requester_user_id": "uuid"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: `requester_user_id` does not match the session
/// - `404 Not Found`: Unknown code
/// - `409 Conflict`: The requester created this code
/// - `410 Gone`: Code expired or usage budget exhausted
/// - `503 Service Unavailable`: Store temporarily unreachable
pub async fn redeem_invite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<RedeemInviteRequest>,
) -> ApiResult<Json<RedeemInviteResponse>> {
    req.validate()?;

    let requester = gate::verify_requester(&auth, req.requester_user_id)?;

    let inviter_user_id = state.invites.redeem(&req.code, requester).await?;

    Ok(Json(RedeemInviteResponse { inviter_user_id }))
}
