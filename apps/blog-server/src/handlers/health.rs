//! Health check endpoint.

use actix_web::{HttpResponse, web};
use blog_shared::dto::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - returns server and content store status.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = state.store_healthy().await;
    let response = HealthResponse {
        status: (if healthy { "ok" } else { "degraded" }).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.backend.as_str().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
