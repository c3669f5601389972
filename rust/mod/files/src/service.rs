use std::sync::Arc;

use fleetwatch_core::{new_id, ServiceError};
use fleetwatch_kv::KVStore;
use fleetwatch_store::KvOps;
use tracing::info;

use crate::model::{FileEntry, FileRequest};

/// Registry of executable files the dispatcher can point terminals at.
pub struct FileRegistry {
    entries: KvOps<FileEntry>,
}

impl FileRegistry {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            entries: KvOps::new(kv),
        }
    }

    pub fn list(&self) -> Result<Vec<FileEntry>, ServiceError> {
        self.entries.list()
    }

    pub fn create(&self, req: FileRequest) -> Result<FileEntry, ServiceError> {
        let entry = self.entries.insert(req.into_entry(new_id())?)?;
        info!(id = %entry.id, name = %entry.name, version = %entry.version, "file registered");
        Ok(entry)
    }

    pub fn get(&self, id: &str) -> Result<FileEntry, ServiceError> {
        self.entries.get_or_err(id)
    }

    pub fn update(&self, id: &str, req: FileRequest) -> Result<FileEntry, ServiceError> {
        let existing = self.entries.get_or_err(id)?;
        let entry = self.entries.replace(req.apply_to(existing)?)?;
        info!(id = %entry.id, version = %entry.version, "file updated");
        Ok(entry)
    }
}
