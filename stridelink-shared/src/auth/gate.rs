/// Requester identity gate
///
/// Every entry point that accepts a requester or creator user ID in the
/// request body must verify it equals the identity the session actually
/// authenticated, before doing any work. A mismatch is rejected as
/// Unauthorized, never silently substituted with the session identity.

use crate::auth::middleware::AuthContext;
use crate::invite::service::InviteError;
use uuid::Uuid;

/// Verifies a claimed user ID against the authenticated session
///
/// # Returns
///
/// The verified user ID, for use as the operation's requester
///
/// # Errors
///
/// [`InviteError::Unauthorized`] if the claimed ID is not the session
/// user
///
/// # Example
///
/// ```
/// use stridelink_shared::auth::gate::verify_requester;
/// use stridelink_shared::auth::middleware::AuthContext;
/// use uuid::Uuid;
///
/// let me = Uuid::new_v4();
/// let session = AuthContext { user_id: me };
///
/// assert!(verify_requester(&session, me).is_ok());
/// assert!(verify_requester(&session, Uuid::new_v4()).is_err());
/// ```
pub fn verify_requester(ctx: &AuthContext, claimed_user_id: Uuid) -> Result<Uuid, InviteError> {
    if ctx.user_id == claimed_user_id {
        Ok(claimed_user_id)
    } else {
        Err(InviteError::Unauthorized)
    }
}
