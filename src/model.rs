//! Vehicle and unit records as stored and served.

use serde::Serialize;

/// A named unit of measure. Names are unique and case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub id: i64,
    pub name: String,
}

/// Serialized form: `{"id", "capacity", "unit"}` with the unit flattened to its name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: i64,
    pub capacity: f64,
    pub unit: String,
}

/// A validated candidate, ready to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewVehicle {
    pub capacity: f64,
    pub unit: String,
}
