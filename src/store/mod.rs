//! Persistence seam: the store interface handlers are given, and its backends.

mod memory;
mod postgres;

pub use memory::MemoryVehicleStore;
pub use postgres::{ensure_database_exists, PgVehicleStore};

use crate::error::AppError;
use crate::model::{NewVehicle, Vehicle};
use async_trait::async_trait;

/// Backing store for vehicles and their units.
///
/// Every mutating call is one transaction: units named by the input are resolved
/// (found or created) inside it, and either all rows land or none do.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// All vehicles, ordered by id.
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError>;

    async fn find_vehicle(&self, id: i64) -> Result<Option<Vehicle>, AppError>;

    /// Insert one vehicle per input, returned in input order with their new ids.
    async fn insert_vehicles(&self, vehicles: &[NewVehicle]) -> Result<Vec<Vehicle>, AppError>;

    /// Overwrite capacity and unit of an existing vehicle. `None` when the id is unknown.
    async fn update_vehicle(&self, id: i64, vehicle: &NewVehicle) -> Result<Option<Vehicle>, AppError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
