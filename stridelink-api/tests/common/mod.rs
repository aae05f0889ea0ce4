/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup
/// - Test user creation
/// - JWT token generation
/// - API client helpers
///
/// Tests expect `DATABASE_URL` and `JWT_SECRET` in the environment (or a
/// `.env` file); migrations run idempotently on setup.

use axum::body::Body;
use axum::http::Request;
use sqlx::PgPool;
use stridelink_api::app::{build_router, AppState};
use stridelink_api::config::Config;
use stridelink_shared::auth::jwt::{create_token, Claims, TokenType};
use stridelink_shared::invite::code;
use uuid::Uuid;

/// A user created for a test, together with a valid access token
pub struct TestUser {
    pub id: Uuid,
    pub qr_code_id: String,
    pub jwt_token: String,
}

impl TestUser {
    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Creates a test user with a fresh QR identifier and access token
    pub async fn create_user(&self) -> anyhow::Result<TestUser> {
        let qr_code_id = code::generate();

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO users (display_name, qr_code_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(format!("Test User {}", Uuid::new_v4()))
        .bind(&qr_code_id)
        .fetch_one(&self.db)
        .await?;

        let claims = Claims::new(id, TokenType::Access);
        let jwt_token = create_token(&claims, &self.config.jwt.secret)?;

        Ok(TestUser {
            id,
            qr_code_id,
            jwt_token,
        })
    }
}

/// Builds an authenticated JSON POST request
pub fn json_post(uri: &str, auth_header: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", auth_header)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds an authenticated GET request
pub fn get(uri: &str, auth_header: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", auth_header)
        .body(Body::empty())
        .unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
