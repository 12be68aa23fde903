//! Operational endpoints: liveness, store readiness, build info.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct Probe {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<&'static str>,
}

async fn liveness() -> Json<Probe> {
    Json(Probe {
        status: "ok",
        store: None,
    })
}

/// 200 while the vehicle store answers a ping, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Probe>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Probe {
                status: "ok",
                store: Some("ok"),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "vehicle store not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Probe {
                    status: "degraded",
                    store: Some("unavailable"),
                }),
            )
        }
    }
}

async fn build_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(liveness))
        .route("/ready", get(readiness))
        .route("/version", get(build_info))
        .with_state(state)
}
