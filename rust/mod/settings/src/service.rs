use std::sync::Arc;

use fleetwatch_core::ServiceError;
use serde_json::Value;
use tracing::info;

use crate::store::SettingsStore;

/// Read and replace the shared configuration document.
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn get_config(&self) -> Result<Value, ServiceError> {
        self.store.load()
    }

    /// Replace the document. Only non-empty JSON objects are accepted.
    pub fn save_config(&self, doc: Value) -> Result<(), ServiceError> {
        match &doc {
            Value::Object(map) if !map.is_empty() => {}
            Value::Object(_) => {
                return Err(ServiceError::Validation("configuration is empty".into()))
            }
            _ => {
                return Err(ServiceError::Validation(
                    "configuration must be a JSON object".into(),
                ))
            }
        }
        self.store.save(&doc)?;
        info!("configuration saved");
        Ok(())
    }
}
