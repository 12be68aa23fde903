//! End-to-end requests against the router, mostly backed by the in-memory store.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use vehicle_registry::{app, AppError, AppState, MemoryVehicleStore, NewVehicle, Vehicle, VehicleStore};

fn router() -> (Router, Arc<MemoryVehicleStore>) {
    let store = Arc::new(MemoryVehicleStore::new());
    let app = app(AppState::new(store.clone()), 1024 * 1024);
    (app, store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let (app, _) = router();
    let (status, body) = send(
        &app,
        Method::POST,
        "/vehicle",
        Some(json!({"vehicles": [{"capacity": 10.5, "unit": "liters"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!([{"capacity": 10.5, "unit": "liters", "id": 1}]));

    let (status, body) = send(&app, Method::GET, "/vehicle/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "capacity": 10.5, "unit": "liters"}));
}

#[tokio::test]
async fn list_returns_all_in_id_order() {
    let (app, _) = router();
    send(
        &app,
        Method::POST,
        "/vehicle",
        Some(json!({"vehicles": [
            {"capacity": 1.5, "unit": "kg"},
            {"capacity": 2.5, "unit": "tons"}
        ]})),
    )
    .await;
    let (status, body) = send(&app, Method::GET, "/vehicle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": 1, "capacity": 1.5, "unit": "kg"},
            {"id": 2, "capacity": 2.5, "unit": "tons"}
        ])
    );
}

#[tokio::test]
async fn negative_capacity_is_rejected_and_nothing_stored() {
    let (app, store) = router();
    let (status, body) = send(
        &app,
        Method::POST,
        "/vehicle",
        Some(json!({"vehicles": [{"capacity": -1, "unit": "liters"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_capacity");
    assert_eq!(body["error"]["details"], json!({"capacity": -1, "unit": "liters"}));
    assert!(store.units().is_empty());

    let (_, list) = send(&app, Method::GET, "/vehicle", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn non_alphabetic_unit_is_rejected() {
    let (app, _) = router();
    let (status, body) = send(
        &app,
        Method::POST,
        "/vehicle",
        Some(json!({"vehicles": [{"capacity": 5, "unit": "L1ters"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_unit");
}

#[tokio::test]
async fn batch_with_one_invalid_candidate_is_all_or_nothing() {
    let (app, _) = router();
    let bad = json!({"capacity": 3.0});
    let (status, body) = send(
        &app,
        Method::POST,
        "/vehicle",
        Some(json!({"vehicles": [
            {"capacity": 1.0, "unit": "kg"},
            {"capacity": 2.0, "unit": "kg"},
            bad.clone()
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "missing_field");
    assert_eq!(body["error"]["details"], bad);

    let (_, list) = send(&app, Method::GET, "/vehicle", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn envelope_errors() {
    let (app, _) = router();
    let (status, body) = send(&app, Method::POST, "/vehicle", Some(json!({"cars": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "missing_field");

    let (status, body) = send(&app, Method::POST, "/vehicle", Some(json!({"vehicles": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "empty_input");

    let (status, body) = send(&app, Method::POST, "/vehicle", Some(json!([1]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request_format");
}

#[tokio::test]
async fn non_json_body_is_invalid_format() {
    let (app, _) = router();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/vehicle")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("capacity=1"))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/vehicle")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn same_unit_name_resolves_to_one_unit() {
    let (app, store) = router();
    for capacity in [1.0, 2.0] {
        send(
            &app,
            Method::POST,
            "/vehicle",
            Some(json!({"vehicles": [{"capacity": capacity, "unit": "liters"}]})),
        )
        .await;
    }
    let (_, a) = send(&app, Method::GET, "/vehicle/1", None).await;
    let (_, b) = send(&app, Method::GET, "/vehicle/2", None).await;
    assert_eq!(a["unit"], "liters");
    assert_eq!(b["unit"], "liters");
    assert_eq!(store.units().len(), 1);
}

#[tokio::test]
async fn get_unknown_or_non_integer_id_is_not_found() {
    let (app, _) = router();
    let (status, body) = send(&app, Method::GET, "/vehicle/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&app, Method::GET, "/vehicle/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_updates_capacity_and_unit() {
    let (app, store) = router();
    send(
        &app,
        Method::POST,
        "/vehicle",
        Some(json!({"vehicles": [{"capacity": 1.0, "unit": "kg"}]})),
    )
    .await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/vehicle/1",
        Some(json!({"capacity": 7.25, "unit": "tons", "ignored": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "capacity": 7.25, "unit": "tons"}));

    let (_, body) = send(&app, Method::GET, "/vehicle/1", None).await;
    assert_eq!(body, json!({"id": 1, "capacity": 7.25, "unit": "tons"}));
    assert_eq!(store.units().len(), 2);
}

#[tokio::test]
async fn put_unknown_id_is_not_found_without_mutation() {
    let (app, store) = router();
    let (status, _) = send(
        &app,
        Method::PUT,
        "/vehicle/5",
        Some(json!({"capacity": 1.0, "unit": "kg"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(store.units().is_empty());

    let (_, list) = send(&app, Method::GET, "/vehicle", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn put_missing_field_leaves_record_unchanged() {
    let (app, _) = router();
    send(
        &app,
        Method::POST,
        "/vehicle",
        Some(json!({"vehicles": [{"capacity": 1.0, "unit": "kg"}]})),
    )
    .await;
    for partial in [json!({"capacity": 3.0}), json!({"unit": "tons"})] {
        let (status, body) = send(&app, Method::PUT, "/vehicle/1", Some(partial)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "missing_field");
    }
    let (status, body) = send(
        &app,
        Method::PUT,
        "/vehicle/1",
        Some(json!({"capacity": -2.0, "unit": "tons"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_capacity");

    let (_, body) = send(&app, Method::GET, "/vehicle/1", None).await;
    assert_eq!(body, json!({"id": 1, "capacity": 1.0, "unit": "kg"}));
}

#[tokio::test]
async fn health_and_ready() {
    let (app, _) = router();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "store": "ok"}));
}

/// Store whose backend is gone: every call fails.
struct UnreachableStore;

#[async_trait::async_trait]
impl VehicleStore for UnreachableStore {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn find_vehicle(&self, _id: i64) -> Result<Option<Vehicle>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn insert_vehicles(&self, _vehicles: &[NewVehicle]) -> Result<Vec<Vehicle>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn update_vehicle(&self, _id: i64, _vehicle: &NewVehicle) -> Result<Option<Vehicle>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }
}

#[tokio::test]
async fn unreachable_store_is_not_ready_and_fails_with_500() {
    let app = app(AppState::new(Arc::new(UnreachableStore)), 1024 * 1024);
    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"status": "degraded", "store": "unavailable"}));

    let (status, body) = send(&app, Method::GET, "/vehicle", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "database_error");
}

#[tokio::test]
async fn oversized_body_is_413_and_stores_nothing() {
    let store = Arc::new(MemoryVehicleStore::new());
    let app = app(AppState::new(store.clone()), 64);
    let vehicles: Vec<Value> = (0..20).map(|_| json!({"capacity": 1.0, "unit": "liters"})).collect();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/vehicle")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "vehicles": vehicles }).to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.units().is_empty());
}
