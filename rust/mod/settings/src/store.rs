//! Persistence for the opaque configuration document.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use fleetwatch_core::ServiceError;
use serde_json::Value;
use tracing::debug;

/// Load/save of the configuration blob. Saves replace the whole document.
pub trait SettingsStore: Send + Sync {
    /// The saved document, or an empty object when nothing was saved yet.
    fn load(&self) -> Result<Value, ServiceError>;

    fn save(&self, doc: &Value) -> Result<(), ServiceError>;
}

fn empty_doc() -> Value {
    Value::Object(Default::default())
}

/// Document kept as pretty-printed UTF-8 JSON in a single file.
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettings {
    fn load(&self) -> Result<Value, ServiceError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using empty document");
                return Ok(empty_doc());
            }
            Err(e) => {
                return Err(ServiceError::Storage(format!(
                    "read {}: {e}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&text).map_err(|e| {
            ServiceError::Internal(format!("parse {}: {e}", self.path.display()))
        })
    }

    fn save(&self, doc: &Value) -> Result<(), ServiceError> {
        let text = serde_json::to_string_pretty(doc)
            .map_err(|e| ServiceError::Internal(format!("serialize settings: {e}")))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ServiceError::Storage(format!("create {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(&self.path, text)
            .map_err(|e| ServiceError::Storage(format!("write {}: {e}", self.path.display())))
    }
}

/// In-process store, for tests and ephemeral runs.
#[derive(Default)]
pub struct MemorySettings {
    doc: RwLock<Option<Value>>,
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> Result<Value, ServiceError> {
        let guard = self.doc.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone().unwrap_or_else(empty_doc))
    }

    fn save(&self, doc: &Value) -> Result<(), ServiceError> {
        let mut guard = self.doc.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(doc.clone());
        Ok(())
    }
}
