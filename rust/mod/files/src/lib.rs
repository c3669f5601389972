pub mod api;
pub mod model;
pub mod service;
mod store_impls;

use std::sync::Arc;

use axum::Router;
use fleetwatch_core::Module;
use fleetwatch_kv::KVStore;

use service::FileRegistry;

/// Files module: registry of executable files.
pub struct FilesModule {
    registry: Arc<FileRegistry>,
}

impl FilesModule {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            registry: Arc::new(FileRegistry::new(kv)),
        }
    }

    pub fn registry(&self) -> &Arc<FileRegistry> {
        &self.registry
    }
}

impl Module for FilesModule {
    fn name(&self) -> &str {
        "files"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.registry))
    }
}
