use axum::Json;
use livecast_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("livecast-live", env!("CARGO_PKG_VERSION")))
}
