use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use sources_db::repositories::ThumbnailJobRepo;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` when the database answers, `"degraded"` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub features: FeatureFlags,
    /// Thumbnail jobs waiting for a worker. `None` when the database is down.
    pub pending_thumbnails: Option<i64>,
}

#[derive(Serialize)]
pub struct FeatureFlags {
    pub sources: bool,
    pub thumbnails: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = sources_db::health_check(&state.pool).await.is_ok();
    let pending_thumbnails = if db_healthy {
        ThumbnailJobRepo::count_pending(&state.pool).await.ok()
    } else {
        None
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        features: FeatureFlags {
            sources: state.config.sources_enabled,
            thumbnails: state.config.thumbnails_enabled,
        },
        pending_thumbnails,
    })
}

/// Mounted at the root, outside `/api/v1` and the sources feature flag.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
