use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<GatewayState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database) = match state.database().test_connection().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            warn!(error = %error, "health check could not reach the database");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let body = HealthResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        database: database.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };

    (status, Json(body))
}
