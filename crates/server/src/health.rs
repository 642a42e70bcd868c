use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub checked_at: String,
}

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "angebot-server",
        version: env!("CARGO_PKG_VERSION"),
        checked_at: Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use axum::Json;

    use crate::health::health;

    #[tokio::test]
    async fn health_reports_process_identity_and_version() {
        let Json(payload) = health().await;

        assert_eq!(payload.status, "ok");
        assert_eq!(payload.service, "angebot-server");
        assert_eq!(payload.version, env!("CARGO_PKG_VERSION"));
        assert!(!payload.checked_at.is_empty());
    }
}
