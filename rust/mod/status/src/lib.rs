pub mod api;
pub mod model;
pub mod service;
mod store_impls;

use std::sync::Arc;

use axum::Router;
use fleetwatch_core::Module;
use fleetwatch_kv::KVStore;

use service::ReconciliationService;

/// Status module: branch/terminal heartbeat reconciliation.
pub struct StatusModule {
    service: Arc<ReconciliationService>,
}

impl StatusModule {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            service: Arc::new(ReconciliationService::new(kv)),
        }
    }

    /// Shared handle to the service, for in-process consumers.
    pub fn service(&self) -> &Arc<ReconciliationService> {
        &self.service
    }
}

impl Module for StatusModule {
    fn name(&self) -> &str {
        "status"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
