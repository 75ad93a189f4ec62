//! Health endpoint: one round-trip through the persistence gateway.

use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::warn;

use crate::inbound::http::state::HttpState;

/// Service name reported by the health body.
const SERVICE_NAME: &str = "user-directory-api";

/// Liveness probe backed by a trivial database query.
///
/// Reports 200 with a healthy body when the store answers, 500 with the
/// failure description otherwise. The failure description is surfaced
/// deliberately; this is a diagnostic endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 405, description = "Method not allowed; only GET probes are supported"),
        (status = 500, description = "Database unreachable")
    ),
    tags = ["health"],
    operation_id = "health"
)]
pub async fn health(state: web::Data<HttpState>) -> HttpResponse {
    match state.users.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "database": "connected",
            "service": SERVICE_NAME,
        })),
        Err(error) => {
            warn!(%error, "health probe failed");
            HttpResponse::InternalServerError().json(json!({
                "status": "unhealthy",
                "error": error.to_string(),
            }))
        }
    }
}
