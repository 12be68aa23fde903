//! Candidate validation: untyped JSON in, typed `NewVehicle` out.

use crate::error::AppError;
use crate::model::NewVehicle;
use serde_json::{Map, Value};

/// Fields a vehicle candidate must carry.
pub const VEHICLE_FIELDS: [&str; 2] = ["capacity", "unit"];

/// Decode one candidate. Both fields must be present, capacity a non-negative
/// number and unit a non-empty string of letters.
pub fn check_vehicle(candidate: &Value) -> Result<NewVehicle, AppError> {
    let obj = match candidate.as_object() {
        Some(obj) if VEHICLE_FIELDS.iter().all(|f| obj.contains_key(*f)) => obj,
        _ => {
            return Err(AppError::MissingField {
                message: "Incorrect vehicle!".into(),
                object: Some(candidate.clone()),
            })
        }
    };

    let capacity = obj
        .get("capacity")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite() && *c >= 0.0)
        .ok_or_else(|| AppError::InvalidCapacity(candidate.clone()))?;

    let unit = obj
        .get("unit")
        .and_then(Value::as_str)
        .filter(|u| is_unit_name(u))
        .ok_or_else(|| AppError::InvalidUnit(candidate.clone()))?;

    Ok(NewVehicle {
        capacity,
        unit: unit.to_string(),
    })
}

/// Copy only the recognized vehicle fields out of a request body, failing on the first one absent.
pub fn require_fields(body: &Map<String, Value>) -> Result<Value, AppError> {
    let mut out = Map::new();
    for field in VEHICLE_FIELDS {
        let v = body
            .get(field)
            .ok_or_else(|| AppError::missing_field(format!("{} missing in request data", field)))?;
        out.insert(field.to_string(), v.clone());
    }
    Ok(Value::Object(out))
}

fn is_unit_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}
