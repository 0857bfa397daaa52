use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use crate::{jobs::change_bridge::FeedState, state::AppState};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
    /// "up" when the store answered a ping
    pub store: String,
    pub backend: String,
    /// starting | streaming | degraded
    pub change_feed: String,
    pub clients: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service status, degraded when the store or change feed is down", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_up = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("⚠️ Health check: store ping failed: {}", e);
            false
        }
    };
    let feed = state.change_feed.get();

    let status = if store_up && feed != FeedState::Degraded {
        "healthy"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        store: if store_up { "up" } else { "down" }.to_string(),
        backend: state.store.backend_name().to_string(),
        change_feed: feed.as_str().to_string(),
        clients: state.broadcaster.client_count(),
    })
}
