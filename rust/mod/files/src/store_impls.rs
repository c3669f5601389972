//! KvRecord implementation for the file registry.

use fleetwatch_core::now_rfc3339;
use fleetwatch_store::KvRecord;

use crate::model::FileEntry;

impl KvRecord for FileEntry {
    const RESOURCE: &'static str = "file";

    fn kv_prefix() -> &'static str {
        "files:entry:"
    }

    fn key_value(&self) -> String {
        self.id.clone()
    }

    fn before_write(&mut self) {
        let now = now_rfc3339();
        if self.created_at.is_empty() {
            self.created_at = now.clone();
        }
        self.updated_at = now;
    }
}
