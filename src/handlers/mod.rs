pub mod charts;
pub mod health;
pub mod metrics_handler;
pub mod pages;
pub mod predict;

use std::sync::Arc;

use crate::artifacts::Artifacts;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<Artifacts>,
}

impl AppState {
    pub fn new(artifacts: Artifacts) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
        }
    }
}
