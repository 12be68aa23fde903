//! Vehicle routes: `/vehicle` and `/vehicle/:id`.

use crate::handlers::vehicle::{create, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub fn vehicle_routes(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/vehicle", get(list).post(create))
        .route("/vehicle/:id", get(read).put(update))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .with_state(state)
}
