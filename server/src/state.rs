use crate::engine::PartnershipEngine;

/// Shared handler state. Cloned per request; the engine is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub engine: PartnershipEngine,
}

impl AppState {
    pub fn new(engine: PartnershipEngine) -> Self {
        Self { engine }
    }
}
