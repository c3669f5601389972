pub mod api;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;
use fleetwatch_core::Module;

use service::SettingsService;
use store::SettingsStore;

/// Settings module: the shared configuration document.
pub struct SettingsModule {
    service: Arc<SettingsService>,
}

impl SettingsModule {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            service: Arc::new(SettingsService::new(store)),
        }
    }

    pub fn service(&self) -> &Arc<SettingsService> {
        &self.service
    }
}

impl Module for SettingsModule {
    fn name(&self) -> &str {
        "settings"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
