//! `fleetwatchd`: branch status and scheduled dispatch server.
//!
//! Usage:
//!   fleetwatchd [--data-dir <dir>] [--listen <addr>] [--tick-secs <n>] [--no-scheduler]

mod fleet;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use fleetwatch_core::{ServiceConfig, MAX_TICK_SECS};
use schedule::executor::LogExecutor;
use settings::store::JsonFileSettings;
use tracing::{error, info};

use routes::Modules;

/// Fleet status and schedule dispatch server.
#[derive(Parser, Debug)]
#[command(name = "fleetwatchd", about = "Fleet status and schedule dispatch server")]
struct Cli {
    /// Directory for the database and config.json.
    #[arg(long = "data-dir", default_value = "data")]
    data_dir: PathBuf,

    /// Database file (defaults to <data-dir>/data.redb).
    #[arg(long = "db")]
    db: Option<PathBuf>,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Seconds between dispatch driver ticks (1 to 30).
    #[arg(
        long = "tick-secs",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TICK_SECS as u64)
    )]
    tick_secs: u64,

    /// Do not start the background dispatch driver.
    #[arg(long = "no-scheduler")]
    no_scheduler: bool,
}

impl Cli {
    fn into_config(self) -> ServiceConfig {
        ServiceConfig {
            data_dir: Some(self.data_dir),
            db_path: self.db,
            settings_path: None,
            listen: self.listen,
            scheduler_enabled: !self.no_scheduler,
            tick_secs: self.tick_secs,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Cli::parse().into_config();

    if let Some(dir) = &config.data_dir {
        std::fs::create_dir_all(dir)?;
    }

    let db_path = config.resolve_db_path();
    info!("Opening database {}", db_path.display());
    let kv: Arc<dyn fleetwatch_kv::KVStore> = Arc::new(
        fleetwatch_kv::RedbStore::open(&db_path)
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );
    let settings_store = Arc::new(JsonFileSettings::new(config.resolve_settings_path()));

    let modules = Modules::new(kv, settings_store, Arc::new(LogExecutor));

    let driver = if config.scheduler_enabled {
        Some(modules.schedule.start_driver(config.tick_interval()))
    } else {
        info!("Dispatch driver disabled");
        None
    };

    let app = routes::build_router(&modules);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("fleetwatchd listening on {}", config.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    if let Some(cancel) = driver {
        cancel.cancel();
    }
    info!("fleetwatchd stopped");
    Ok(())
}

/// Resolve when `signal` fires. A failure to install the signal handler is
/// logged and also ends the wait.
async fn shutdown_on<F, E>(signal: F)
where
    F: std::future::Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    match signal.await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!("failed to listen for shutdown signal: {e}"),
    }
}
