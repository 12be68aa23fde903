//! VehicleService: request-level orchestration over a `VehicleStore`.

mod validation;
mod vehicles;
pub use validation::{check_vehicle, require_fields, VEHICLE_FIELDS};
pub use vehicles::VehicleService;
