/// Integration tests for the invite API
///
/// These tests verify the full HTTP surface end-to-end:
/// - Invite creation and redemption with authentication
/// - The requester gate (session identity vs. claimed identity)
/// - QR resolution
/// - Error status mapping
///
/// Tests expect `DATABASE_URL` and `JWT_SECRET` in the environment (or a
/// `.env` file).

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

/// Create an invite, then redeem it as another user
#[tokio::test]
async fn test_create_and_redeem_invite() {
    let ctx = TestContext::new().await.unwrap();
    let inviter = ctx.create_user().await.unwrap();
    let joiner = ctx.create_user().await.unwrap();

    // Create
    let request = common::json_post(
        "/v1/invites",
        &inviter.auth_header(),
        json!({
            "creator_user_id": inviter.id,
            "max_usages": 5
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = common::body_json(response).await;
    let code = created["code"].as_str().unwrap().to_string();
    assert_eq!(
        created["deep_link"],
        format!("{}://invite/{}", ctx.config.invite.link_scheme, code)
    );
    assert_eq!(created["max_usages"], 5);
    assert!(created["expires_at"].is_null());

    // Redeem as the joiner
    let request = common::json_post(
        "/v1/invites/redeem",
        &joiner.auth_header(),
        json!({
            "code": code,
            "requester_user_id": joiner.id
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let redeemed = common::body_json(response).await;
    assert_eq!(redeemed["inviter_user_id"], inviter.id.to_string());
}

/// Redeeming your own invite is rejected with 409
#[tokio::test]
async fn test_self_redemption_conflict() {
    let ctx = TestContext::new().await.unwrap();
    let inviter = ctx.create_user().await.unwrap();

    let request = common::json_post(
        "/v1/invites",
        &inviter.auth_header(),
        json!({ "creator_user_id": inviter.id }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let code = common::body_json(response).await["code"]
        .as_str()
        .unwrap()
        .to_string();

    let request = common::json_post(
        "/v1/invites/redeem",
        &inviter.auth_header(),
        json!({
            "code": code,
            "requester_user_id": inviter.id
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "self_invite");
}

/// Unknown codes map to 404
#[tokio::test]
async fn test_redeem_unknown_code_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let joiner = ctx.create_user().await.unwrap();

    let request = common::json_post(
        "/v1/invites/redeem",
        &joiner.auth_header(),
        json!({
            "code": "does-not-exist",
            "requester_user_id": joiner.id
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// An exhausted invite maps to 410 with a distinct error code
#[tokio::test]
async fn test_exhausted_invite_gone() {
    let ctx = TestContext::new().await.unwrap();
    let inviter = ctx.create_user().await.unwrap();
    let first = ctx.create_user().await.unwrap();
    let second = ctx.create_user().await.unwrap();

    let request = common::json_post(
        "/v1/invites",
        &inviter.auth_header(),
        json!({
            "creator_user_id": inviter.id,
            "max_usages": 1
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let code = common::body_json(response).await["code"]
        .as_str()
        .unwrap()
        .to_string();

    let request = common::json_post(
        "/v1/invites/redeem",
        &first.auth_header(),
        json!({ "code": code, "requester_user_id": first.id }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = common::json_post(
        "/v1/invites/redeem",
        &second.auth_header(),
        json!({ "code": code, "requester_user_id": second.id }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::GONE);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "invite_exhausted");
}

/// Listing returns the caller's codes with derived status
#[tokio::test]
async fn test_list_invites() {
    let ctx = TestContext::new().await.unwrap();
    let inviter = ctx.create_user().await.unwrap();

    let request = common::json_post(
        "/v1/invites",
        &inviter.auth_header(),
        json!({ "creator_user_id": inviter.id, "max_usages": 3 }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let code = common::body_json(response).await["code"]
        .as_str()
        .unwrap()
        .to_string();

    let request = common::get("/v1/invites", &inviter.auth_header());
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let invites = body["invites"].as_array().unwrap();
    let entry = invites
        .iter()
        .find(|i| i["code"] == code.as_str())
        .expect("created invite should be listed");

    assert_eq!(entry["status"], "active");
    assert_eq!(entry["usage_count"], 0);
    assert_eq!(entry["max_usages"], 3);
}

/// The requester gate rejects requests claiming another identity
#[tokio::test]
async fn test_requester_gate_forbidden() {
    let ctx = TestContext::new().await.unwrap();
    let caller = ctx.create_user().await.unwrap();
    let victim = ctx.create_user().await.unwrap();

    // Create on someone else's behalf
    let request = common::json_post(
        "/v1/invites",
        &caller.auth_header(),
        json!({ "creator_user_id": victim.id }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Redeem on someone else's behalf
    let request = common::json_post(
        "/v1/invites/redeem",
        &caller.auth_header(),
        json!({ "code": "whatever", "requester_user_id": victim.id }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Requests without a token are rejected before any handler runs
#[tokio::test]
async fn test_authentication_required() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/invites")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Invalid request fields map to 422 with per-field details
#[tokio::test]
async fn test_validation_errors() {
    let ctx = TestContext::new().await.unwrap();
    let inviter = ctx.create_user().await.unwrap();

    let request = common::json_post(
        "/v1/invites",
        &inviter.auth_header(),
        json!({
            "creator_user_id": inviter.id,
            "max_usages": 0
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "max_usages");
}

/// Resolve another user's QR identifier
///
/// QR resolution and code redemption are the two introduction paths;
/// both return the inviter's identity under the same field name.
#[tokio::test]
async fn test_qr_resolution() {
    let ctx = TestContext::new().await.unwrap();
    let owner = ctx.create_user().await.unwrap();
    let scanner = ctx.create_user().await.unwrap();

    let request = common::json_post(
        "/v1/qr/resolve",
        &scanner.auth_header(),
        json!({
            "qr_code_id": owner.qr_code_id,
            "requester_user_id": scanner.id
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["inviter_user_id"], owner.id.to_string());
}

/// Both introduction paths hand back an identically-shaped identity
#[tokio::test]
async fn test_redeem_and_qr_responses_share_identity_field() {
    let ctx = TestContext::new().await.unwrap();
    let inviter = ctx.create_user().await.unwrap();
    let joiner = ctx.create_user().await.unwrap();

    let request = common::json_post(
        "/v1/invites",
        &inviter.auth_header(),
        json!({ "creator_user_id": inviter.id }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let code = common::body_json(response).await["code"]
        .as_str()
        .unwrap()
        .to_string();

    let request = common::json_post(
        "/v1/invites/redeem",
        &joiner.auth_header(),
        json!({ "code": code, "requester_user_id": joiner.id }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let from_redeem = common::body_json(response).await;

    let request = common::json_post(
        "/v1/qr/resolve",
        &joiner.auth_header(),
        json!({
            "qr_code_id": inviter.qr_code_id,
            "requester_user_id": joiner.id
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let from_qr = common::body_json(response).await;

    assert_eq!(from_redeem["inviter_user_id"], inviter.id.to_string());
    assert_eq!(from_redeem["inviter_user_id"], from_qr["inviter_user_id"]);
}

/// Scanning your own QR code is rejected with 409
#[tokio::test]
async fn test_qr_self_scan_conflict() {
    let ctx = TestContext::new().await.unwrap();
    let owner = ctx.create_user().await.unwrap();

    let request = common::json_post(
        "/v1/qr/resolve",
        &owner.auth_header(),
        json!({
            "qr_code_id": owner.qr_code_id,
            "requester_user_id": owner.id
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Fetching your own QR identifier returns it with a deep link
#[tokio::test]
async fn test_my_qr() {
    let ctx = TestContext::new().await.unwrap();
    let owner = ctx.create_user().await.unwrap();

    let request = common::get("/v1/qr/me", &owner.auth_header());
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["qr_code_id"], owner.qr_code_id.as_str());
    assert_eq!(
        body["deep_link"],
        format!(
            "{}://invite/{}",
            ctx.config.invite.link_scheme, owner.qr_code_id
        )
    );
}

/// Health endpoint is public and reports database connectivity
#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

/// Redemption observed via a second list call
#[tokio::test]
async fn test_usage_count_visible_after_redemption() {
    let ctx = TestContext::new().await.unwrap();
    let inviter = ctx.create_user().await.unwrap();
    let joiner = ctx.create_user().await.unwrap();

    let request = common::json_post(
        "/v1/invites",
        &inviter.auth_header(),
        json!({ "creator_user_id": inviter.id, "max_usages": 2 }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let code = common::body_json(response).await["code"]
        .as_str()
        .unwrap()
        .to_string();

    let request = common::json_post(
        "/v1/invites/redeem",
        &joiner.auth_header(),
        json!({ "code": code, "requester_user_id": joiner.id }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = common::get("/v1/invites", &inviter.auth_header());
    let response = ctx.app.clone().call(request).await.unwrap();
    let body = common::body_json(response).await;
    let entry = body["invites"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["code"] == code.as_str())
        .unwrap()
        .clone();

    assert_eq!(entry["usage_count"], 1);
    assert_eq!(entry["status"], "active");
}
