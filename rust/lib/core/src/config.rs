use std::path::PathBuf;
use std::time::Duration;

/// Longest dispatch driver tick, in seconds.
pub const MAX_TICK_SECS: u64 = 30;

/// Runtime configuration of the server.
///
/// The binary fills this from command-line flags, then passes it to storage
/// and driver initialization.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the database and the configuration blob.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database file.
    /// Defaults to `{data_dir}/data.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Path to the JSON configuration blob served by `/api/config`.
    /// Defaults to `{data_dir}/config.json` if not specified.
    pub settings_path: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,

    /// Run the background dispatch driver.
    pub scheduler_enabled: bool,

    /// How often the dispatch driver evaluates the schedule (seconds).
    pub tick_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            settings_path: None,
            listen: "0.0.0.0:8080".to_string(),
            scheduler_enabled: true,
            tick_secs: 15,
        }
    }
}

impl ServiceConfig {
    /// Resolve the redb database path, falling back to `{data_dir}/data.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.redb"))
    }

    /// Resolve the configuration blob path, falling back to `{data_dir}/config.json`.
    pub fn resolve_settings_path(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("config.json"))
    }

    /// Dispatch driver tick, clamped to `1..=MAX_TICK_SECS` seconds.
    ///
    /// The driver only evaluates the minute each tick lands in, so a tick
    /// must land in every minute at least once.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_secs.clamp(1, MAX_TICK_SECS))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}
