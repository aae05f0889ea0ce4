/// QR identity endpoints
///
/// In-person variant of invitations: one user scans another's QR code
/// and resolves it to an identity. Resolution never mutates state, so
/// a scan can be retried freely.
///
/// # Endpoints
///
/// - `POST /v1/qr/resolve` - Resolve a scanned QR identifier
/// - `GET /v1/qr/me` - Fetch the caller's own QR identifier

use crate::{app::AppState, error::{ApiError, ApiResult}};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use stridelink_shared::{
    auth::gate,
    auth::middleware::AuthContext,
    models::user_directory::UserDirectory,
};
use uuid::Uuid;
use validator::Validate;

/// Resolve QR request
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveQrRequest {
    /// The scanned QR identifier
    #[validate(length(min = 1, max = 32, message = "QR identifier must be 1-32 characters"))]
    pub qr_code_id: String,

    /// User performing the scan
    ///
    /// Must match the authenticated session identity.
    pub requester_user_id: Uuid,
}

/// Resolve QR response
///
/// Same shape as a code redemption response: both introduction paths
/// hand back the inviter's identity under the same field name.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveQrResponse {
    /// The identity the QR code belongs to
    pub inviter_user_id: Uuid,
}

/// My QR response
#[derive(Debug, Serialize, Deserialize)]
pub struct MyQrResponse {
    /// The caller's QR identifier
    pub qr_code_id: String,

    /// Deep link encoding the identifier
    pub deep_link: String,
}

/// Resolve a scanned QR identifier
///
/// # Endpoint
///
/// ```text
/// POST /v1/qr/resolve
/// Authorization: Bearer <jwt_token>
/// Content-Type: application/json
///
/// {
///   "qr_code_id": "hXp3vR9qLm2sWt8kYb5cNw",
///   "requester_user_id": "uuid"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: `requester_user_id` does not match the session
/// - `404 Not Found`: Unknown QR identifier
/// - `409 Conflict`: The caller scanned their own code
pub async fn resolve_qr(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ResolveQrRequest>,
) -> ApiResult<Json<ResolveQrResponse>> {
    req.validate()?;

    let requester = gate::verify_requester(&auth, req.requester_user_id)?;

    let inviter_user_id = state.invites.resolve_qr(&req.qr_code_id, requester).await?;

    Ok(Json(ResolveQrResponse { inviter_user_id }))
}

/// Fetch the caller's own QR identifier
///
/// # Endpoint
///
/// ```text
/// GET /v1/qr/me
/// Authorization: Bearer <jwt_token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `404 Not Found`: The session user no longer exists
pub async fn my_qr(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MyQrResponse>> {
    let qr_code_id = UserDirectory::qr_for_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(MyQrResponse {
        deep_link: state.links.format(&qr_code_id),
        qr_code_id,
    }))
}
