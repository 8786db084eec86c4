use std::sync::Arc;

use scheduler_store::VehicleStore;

use crate::engine::EngineHandle;

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub store: Arc<dyn VehicleStore>,
}
