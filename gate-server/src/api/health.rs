use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_status: Option<String>,
    #[serde(skip)]
    status_code: StatusCode,
}

impl Health {
    fn new(status: &str, cache_status: Option<&str>, status_code: StatusCode) -> Self {
        Self {
            status: status.to_string(),
            cache_status: cache_status.map(str::to_string),
            status_code,
        }
    }
}

impl IntoResponse for Health {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

/// Liveness check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is alive", body = Health)
    )
)]
pub(crate) async fn health_check() -> Health {
    Health::new("ok", None, StatusCode::OK)
}

/// Readiness check handler, probes the session cache
#[utoipa::path(
    get,
    path = "/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = Health),
        (status = 503, description = "Session cache is unreachable", body = Health)
    )
)]
pub(crate) async fn ready_check(State(state): State<AppState>) -> Health {
    if state.health_check().await {
        Health::new("ok", Some("healthy"), StatusCode::OK)
    } else {
        Health::new("error", Some("unhealthy"), StatusCode::SERVICE_UNAVAILABLE)
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}

#[cfg(test)]
mod test {
    use crate::cache::disabled::DisabledCache;
    use crate::cache::Cache;
    use crate::test_utils::TestFixture;
    use http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_health_endpoint() {
        let fixture = TestFixture::new("").await;
        let response = fixture.get("/health", None).await;
        response.assert_ok();
        assert_eq!(response.json, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_ready_endpoint() {
        let fixture = TestFixture::new("").await;
        let response = fixture.get("/ready", None).await;
        response.assert_ok();
        assert_eq!(
            response.json,
            json!({"status": "ok", "cache_status": "healthy"})
        );
    }

    #[tokio::test]
    async fn test_ready_endpoint_without_cache() {
        let fixture =
            TestFixture::with_cache("", Cache::Disabled(DisabledCache::new())).await;
        let response = fixture.get("/ready", None).await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.json,
            json!({"status": "error", "cache_status": "unhealthy"})
        );
    }
}
