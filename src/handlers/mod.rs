//! HTTP handlers for the vehicle resource.

pub mod vehicle;
pub use vehicle::*;
