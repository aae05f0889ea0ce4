/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use stridelink_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = stridelink_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use stridelink_shared::{
    auth::middleware::jwt_auth_middleware,
    invite::{DeepLinkFormatter, InviteService},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Invite issuance and redemption service
    pub invites: InviteService,

    /// Deep link formatter configured with the process-wide scheme
    pub links: DeepLinkFormatter,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let invites = InviteService::new(db.clone());
        let links = DeepLinkFormatter::new(config.invite.link_scheme.clone());

        Self {
            db,
            config: Arc::new(config),
            invites,
            links,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                   # Health check (public)
/// ├── /v1/                      # API v1 (versioned, authenticated)
///     ├── /invites/
///     │   ├── POST /            # Create invite code
///     │   ├── GET  /            # List own invite codes
///     │   └── POST /redeem      # Redeem invite code
///     └── /qr/
///         ├── POST /resolve     # Resolve scanned QR identifier
///         └── GET  /me          # Fetch own QR identifier
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (all /v1 routes)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Invite routes (require JWT authentication)
    let invite_routes = Router::new()
        .route("/", post(routes::invites::create_invite))
        .route("/", get(routes::invites::list_invites))
        .route("/redeem", post(routes::invites::redeem_invite));

    // QR routes (require JWT authentication)
    let qr_routes = Router::new()
        .route("/resolve", post(routes::qr::resolve_qr))
        .route("/me", get(routes::qr::my_qr));

    // Build complete v1 API behind a single auth layer
    let jwt_secret = state.config.jwt.secret.clone();
    let v1_routes = Router::new()
        .nest("/invites", invite_routes)
        .nest("/qr", qr_routes)
        .layer(axum::middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_secret.clone(), req, next)
        }));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DatabaseConfig, InviteConfig, JwtConfig};

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            invite: InviteConfig {
                link_scheme: "stridelink".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_app_state_creation() {
        let config = test_config();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("lazy pool");

        let state = AppState::new(pool, config);
        assert_eq!(state.jwt_secret(), "test-secret-key-at-least-32-bytes-long");
        assert_eq!(state.links.scheme(), "stridelink");
    }
}
