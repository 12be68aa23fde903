//! Vehicle handlers: list, batch create, read, update.

use crate::error::AppError;
use crate::service::VehicleService;
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

/// Body must be sent as JSON. An oversized body keeps its 413; anything else the
/// extractor refuses is a format error.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(v)| v).map_err(|rejection| {
        tracing::debug!(%rejection, "rejected request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::InvalidRequestFormat("Incorrect request format! Request data must be JSON".into())
        }
    })
}

/// Ids are integers; any other path segment names nothing.
fn vehicle_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::NotFound(rejection.body_text()))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let vehicles = VehicleService::list(state.store.as_ref()).await?;
    Ok((StatusCode::OK, Json(vehicles)))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(body)?;
    let created = VehicleService::create_batch(state.store.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn read(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = vehicle_id(path)?;
    let vehicle = VehicleService::get(state.store.as_ref(), id).await?;
    Ok((StatusCode::OK, Json(vehicle)))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = vehicle_id(path)?;
    // Unknown ids answer 404 before the body is looked at.
    VehicleService::get(state.store.as_ref(), id).await?;
    let body = json_body(body)?;
    let vehicle = VehicleService::update(state.store.as_ref(), id, body).await?;
    Ok((StatusCode::OK, Json(vehicle)))
}
