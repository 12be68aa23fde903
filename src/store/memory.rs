//! In-process store. Used for local runs without a database and in tests.

use super::VehicleStore;
use crate::error::AppError;
use crate::model::{NewVehicle, Unit, Vehicle};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

#[derive(Default)]
struct Tables {
    units: Vec<Unit>,
    /// id -> (capacity, unit_id)
    vehicles: BTreeMap<i64, (f64, i64)>,
    next_vehicle_id: i64,
}

impl Tables {
    /// Unit ids are assigned from 1 in insertion order. Resolution runs under the
    /// write lock so a name is never inserted twice.
    fn resolve_unit(&mut self, name: &str) -> i64 {
        if let Some(unit) = self.units.iter().find(|u| u.name == name) {
            return unit.id;
        }
        let id = self.units.len() as i64 + 1;
        self.units.push(Unit {
            id,
            name: name.to_string(),
        });
        tracing::debug!(unit_id = id, name = %name, "created unit");
        id
    }

    fn unit_name(&self, unit_id: i64) -> String {
        self.units
            .iter()
            .find(|u| u.id == unit_id)
            .map(|u| u.name.clone())
            .unwrap_or_default()
    }

    fn vehicle(&self, id: i64) -> Option<Vehicle> {
        self.vehicles.get(&id).map(|&(capacity, unit_id)| Vehicle {
            id,
            capacity,
            unit: self.unit_name(unit_id),
        })
    }
}

#[derive(Default)]
pub struct MemoryVehicleStore {
    tables: RwLock<Tables>,
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Units known to the store, in creation order.
    pub fn units(&self) -> Vec<Unit> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .units
            .clone()
    }
}

#[async_trait]
impl VehicleStore for MemoryVehicleStore {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables
            .vehicles
            .keys()
            .filter_map(|id| tables.vehicle(*id))
            .collect())
    }

    async fn find_vehicle(&self, id: i64) -> Result<Option<Vehicle>, AppError> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.vehicle(id))
    }

    async fn insert_vehicles(&self, vehicles: &[NewVehicle]) -> Result<Vec<Vehicle>, AppError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let mut out = Vec::with_capacity(vehicles.len());
        for v in vehicles {
            let unit_id = tables.resolve_unit(&v.unit);
            tables.next_vehicle_id += 1;
            let id = tables.next_vehicle_id;
            tables.vehicles.insert(id, (v.capacity, unit_id));
            out.push(Vehicle {
                id,
                capacity: v.capacity,
                unit: v.unit.clone(),
            });
        }
        Ok(out)
    }

    async fn update_vehicle(&self, id: i64, vehicle: &NewVehicle) -> Result<Option<Vehicle>, AppError> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if !tables.vehicles.contains_key(&id) {
            return Ok(None);
        }
        let unit_id = tables.resolve_unit(&vehicle.unit);
        tables.vehicles.insert(id, (vehicle.capacity, unit_id));
        Ok(tables.vehicle(id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
