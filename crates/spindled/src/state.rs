//! Shared handler state

use spindle_core::IngestEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<IngestEngine>,
}

impl AppState {
    pub fn new(engine: IngestEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
