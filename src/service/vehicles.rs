//! List, batch create, read and update of vehicles.

use super::validation::{check_vehicle, require_fields};
use crate::error::AppError;
use crate::model::{NewVehicle, Vehicle};
use crate::store::VehicleStore;
use serde_json::{Map, Value};

pub struct VehicleService;

impl VehicleService {
    pub async fn list(store: &dyn VehicleStore) -> Result<Vec<Vehicle>, AppError> {
        store.list_vehicles().await
    }

    pub async fn get(store: &dyn VehicleStore, id: i64) -> Result<Vehicle, AppError> {
        store
            .find_vehicle(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vehicle {}", id)))
    }

    /// Create every candidate under `body.vehicles` in one transaction. All candidates
    /// are validated before anything is written. Returns the candidates as sent, each
    /// with its new `id`.
    pub async fn create_batch(store: &dyn VehicleStore, body: Value) -> Result<Vec<Value>, AppError> {
        let mut body = into_object(body)?;
        let candidates = match body.remove("vehicles") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(AppError::InvalidRequestFormat(
                    "'vehicles' must be a list".into(),
                ))
            }
            None => return Err(AppError::missing_field("'vehicles' missing in request data")),
        };
        if candidates.is_empty() {
            return Err(AppError::EmptyInput("'vehicles' is empty".into()));
        }

        let new_vehicles = candidates
            .iter()
            .map(check_vehicle)
            .collect::<Result<Vec<NewVehicle>, _>>()?;

        let created = store.insert_vehicles(&new_vehicles).await?;
        tracing::info!(count = created.len(), "created vehicles");

        Ok(candidates
            .into_iter()
            .zip(&created)
            .map(|(mut candidate, row)| {
                if let Value::Object(ref mut m) = candidate {
                    m.insert("id".into(), Value::from(row.id));
                }
                candidate
            })
            .collect())
    }

    /// Replace capacity and unit of vehicle `id`. Both fields are required.
    pub async fn update(store: &dyn VehicleStore, id: i64, body: Value) -> Result<Vehicle, AppError> {
        let body = into_object(body)?;
        let candidate = require_fields(&body)?;
        let new_vehicle = check_vehicle(&candidate)?;
        let updated = store
            .update_vehicle(id, &new_vehicle)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vehicle {}", id)))?;
        tracing::info!(id, "updated vehicle");
        Ok(updated)
    }
}

fn into_object(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::InvalidRequestFormat(
            "Invalid JSON received! Request data must be a JSON object".into(),
        )),
    }
}
