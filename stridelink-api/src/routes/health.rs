/// Health check endpoint
///
/// Provides a health check endpoint for monitoring and load balancers.
///
/// # Endpoint
///
/// `GET /health` - Returns service health status

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status ("healthy" or "degraded")
    pub status: String,

    /// Service version
    pub version: String,

    /// Database connectivity status
    pub database: String,
}

/// Health check handler
///
/// Returns the health status of the API server and its dependencies.
///
/// # Returns
///
/// - `200 OK` with status "healthy" if all systems operational
/// - `503 Service Unavailable` with status "degraded" if database is unreachable
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    // Check database connectivity
    let db_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            "disconnected"
        }
    };

    let is_healthy = db_status == "connected";

    let response = HealthResponse {
        status: if is_healthy { "healthy" } else { "degraded" }.to_string(),
        version: stridelink_shared::VERSION.to_string(),
        database: db_status.to_string(),
    };

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
