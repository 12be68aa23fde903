//! Route tables.

mod common;
mod vehicle;

pub use common::common_routes;
pub use vehicle::vehicle_routes;
