//! Route registration: collects all module routes + system endpoints.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use fleetwatch_core::Module;
use fleetwatch_kv::KVStore;
use schedule::executor::Executor;
use schedule::ScheduleModule;
use settings::store::SettingsStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::fleet::StatusFleet;

/// Every business module of the server, wired to shared backends.
pub struct Modules {
    pub status: status::StatusModule,
    pub schedule: ScheduleModule,
    pub files: files::FilesModule,
    pub settings: settings::SettingsModule,
}

impl Modules {
    pub fn new(
        kv: Arc<dyn KVStore>,
        settings_store: Arc<dyn SettingsStore>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let status = status::StatusModule::new(Arc::clone(&kv));
        let fleet = Arc::new(StatusFleet::new(Arc::clone(status.service())));
        let schedule = ScheduleModule::new(Arc::clone(&kv), fleet, executor);
        let files = files::FilesModule::new(kv);
        let settings = settings::SettingsModule::new(settings_store);
        Self {
            status,
            schedule,
            files,
            settings,
        }
    }

    fn all(&self) -> [&dyn Module; 4] {
        [&self.status, &self.schedule, &self.files, &self.settings]
    }
}

/// Build the complete router: module routes under `/api`, system endpoints
/// at the root, permissive CORS and request tracing on everything.
pub fn build_router(modules: &Modules) -> Router {
    let mut api = Router::new();
    for module in modules.all() {
        info!("mounting {} routes under /api", module.name());
        api = api.merge(module.routes());
    }

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "fleetwatchd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
