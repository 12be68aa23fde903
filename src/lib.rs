//! Vehicle registry: CRUD over vehicles (capacity + unit of measure) with units
//! deduplicated by name.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{ServerConfig, StoreBackend};
pub use error::{AppError, ConfigError};
pub use model::{NewVehicle, Unit, Vehicle};
pub use routes::{common_routes, vehicle_routes};
pub use service::{check_vehicle, VehicleService};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryVehicleStore, PgVehicleStore, VehicleStore};

use axum::Router;

/// Full application router: common routes plus the vehicle resource.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(vehicle_routes(state, body_limit_bytes))
}
