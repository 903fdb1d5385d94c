use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use redate_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

/// GET /health - liveness plus dependency probes. The cache being down only
/// degrades the service; the store being down makes it unhealthy.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let postgres = match state.db.get() {
        Ok(_) => HealthStatus::Healthy,
        Err(_) => HealthStatus::Unhealthy,
    };
    let redis = match state.redis.exists("health:probe").await {
        Ok(_) => HealthStatus::Healthy,
        Err(_) => HealthStatus::Degraded,
    };

    let checks = vec![
        HealthCheck {
            name: "postgres".into(),
            status: postgres,
            message: None,
        },
        HealthCheck {
            name: "redis".into(),
            status: redis,
            message: None,
        },
    ];

    Json(HealthResponse::healthy("redate-api", env!("CARGO_PKG_VERSION")).with_checks(checks))
}
