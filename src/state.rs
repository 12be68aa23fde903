//! Shared application state for all routes.

use crate::store::VehicleStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Injected store; every request talks to persistence through it.
    pub store: Arc<dyn VehicleStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }
}
