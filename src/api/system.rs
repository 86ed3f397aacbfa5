use crate::models::HealthResponse;
use axum::Json;

/// Liveness check. Does not touch the document.
pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
