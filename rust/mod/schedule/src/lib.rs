pub mod api;
pub mod catalog;
pub mod dispatch;
pub mod executor;
pub mod fanout;
pub mod matcher;
pub mod model;
mod store_impls;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use fleetwatch_core::Module;
use fleetwatch_kv::KVStore;
use tokio_util::sync::CancellationToken;

use catalog::ScheduleCatalog;
use dispatch::{Dispatcher, FleetDirectory};
use executor::Executor;
use worker::DispatchDriver;

/// Schedule module: job catalog, matching, fanout and dispatch.
pub struct ScheduleModule {
    dispatcher: Arc<Dispatcher>,
}

impl ScheduleModule {
    pub fn new(
        kv: Arc<dyn KVStore>,
        fleet: Arc<dyn FleetDirectory>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let catalog = Arc::new(ScheduleCatalog::new(kv));
        Self {
            dispatcher: Arc::new(Dispatcher::new(catalog, fleet, executor)),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn catalog(&self) -> &Arc<ScheduleCatalog> {
        self.dispatcher.catalog()
    }

    /// Spawn the periodic dispatch driver. Cancel the token to stop it.
    pub fn start_driver(&self, tick: Duration) -> CancellationToken {
        let driver = Arc::new(DispatchDriver::new(Arc::clone(&self.dispatcher)));
        worker::start(driver, tick)
    }
}

impl Module for ScheduleModule {
    fn name(&self) -> &str {
        "schedule"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.dispatcher))
    }
}
