use std::path::Path;
use std::sync::Arc;

use ::redb::backends::InMemoryBackend;
use ::redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust embedded
/// key-value database.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(KVError::storage)?;
        debug!("RedbStore: opened {:?}", path);
        Self::init(db)
    }

    /// Create a database that lives only in memory. Contents are lost on drop.
    pub fn in_memory() -> Result<Self, KVError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(KVError::storage)?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self, KVError> {
        // Make sure the table exists so the first read does not fail.
        let write_txn = db.begin_write().map_err(KVError::storage)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
        }
        write_txn.commit().map_err(KVError::storage)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = read_txn.open_table(TABLE).map_err(KVError::storage)?;

        let value = table.get(key).map_err(KVError::storage)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        let replaced = {
            let mut table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
            let previous = table.insert(key, value).map_err(KVError::storage)?;
            previous.is_some()
        };
        write_txn.commit().map_err(KVError::storage)?;
        Ok(replaced)
    }

    fn insert_new(&self, key: &str, value: &[u8]) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        let inserted = {
            let mut table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
            let exists = table.get(key).map_err(KVError::storage)?.is_some();
            if !exists {
                table.insert(key, value).map_err(KVError::storage)?;
            }
            !exists
        };
        if inserted {
            write_txn.commit().map_err(KVError::storage)?;
        } else {
            write_txn.abort().map_err(KVError::storage)?;
        }
        Ok(inserted)
    }

    fn delete(&self, key: &str) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        let removed = {
            let mut table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
            let previous = table.remove(key).map_err(KVError::storage)?;
            previous.is_some()
        };
        write_txn.commit().map_err(KVError::storage)?;
        Ok(removed)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = read_txn.open_table(TABLE).map_err(KVError::storage)?;

        let mut results = Vec::new();
        for entry in table.range(prefix..).map_err(KVError::storage)? {
            let (key, value) = entry.map_err(KVError::storage)?;
            let key = key.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key, value.value().to_vec()));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (RedbStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("test.redb")).unwrap();
        (store, dir)
    }

    #[test]
    fn set_reports_replacement() {
        let (store, _dir) = open_temp();
        assert!(!store.set("a:1", b"one").unwrap());
        assert!(store.set("a:1", b"uno").unwrap());
        assert_eq!(store.get("a:1").unwrap().as_deref(), Some(&b"uno"[..]));
    }

    #[test]
    fn insert_new_does_not_overwrite() {
        let store = RedbStore::in_memory().unwrap();
        assert!(store.insert_new("k", b"first").unwrap());
        assert!(!store.insert_new("k", b"second").unwrap());
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"first"[..]));
    }

    #[test]
    fn delete_missing_key() {
        let store = RedbStore::in_memory().unwrap();
        assert!(!store.delete("ghost").unwrap());
        store.set("ghost", b"boo").unwrap();
        assert!(store.delete("ghost").unwrap());
        assert!(store.get("ghost").unwrap().is_none());
    }

    #[test]
    fn scan_stops_at_prefix_boundary() {
        let (store, _dir) = open_temp();
        store.set("status:branch:B1", b"1").unwrap();
        store.set("status:branch:B2", b"2").unwrap();
        store.set("status:c", b"x").unwrap();
        store.set("schedule:job:1", b"j").unwrap();

        let found = store.scan("status:branch:").unwrap();
        let keys: Vec<&str> = found.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["status:branch:B1", "status:branch:B2"]);
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persist.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.set("cfg", b"{}").unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("cfg").unwrap().as_deref(), Some(&b"{}"[..]));
    }
}
