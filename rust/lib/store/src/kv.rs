//! KvRecord trait + KvOps collection operations.
//!
//! A model impls `KvRecord` to declare its key and write hook.
//! `KvOps<T>` provides find/get/insert/upsert/delete over a KVStore backend.

use std::marker::PhantomData;
use std::sync::Arc;

use fleetwatch_core::ServiceError;
use fleetwatch_kv::{KVError, KVStore};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// Trait implemented by records persisted as JSON documents in the KV store.
pub trait KvRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Human-readable resource name used in error messages, e.g. `"job"`.
    const RESOURCE: &'static str;

    /// KV key prefix: "{module}:{resource}:".
    fn kv_prefix() -> &'static str;

    /// The key of this instance, without the prefix.
    fn key_value(&self) -> String;

    /// Called before every write (insert, upsert or replace).
    fn before_write(&mut self) {}
}

/// Escape one component of a composite key so that `:` stays a separator.
pub fn key_part(raw: &str) -> String {
    raw.replace('%', "%25").replace(':', "%3A")
}

/// Collection operations for a KvRecord model. Holds a reference to the KV backend.
pub struct KvOps<T: KvRecord> {
    kv: Arc<dyn KVStore>,
    _phantom: PhantomData<T>,
}

impl<T: KvRecord> Clone for KvOps<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.kv))
    }
}

impl<T: KvRecord> KvOps<T> {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            kv,
            _phantom: PhantomData,
        }
    }

    fn make_key(id: &str) -> String {
        format!("{}{}", T::kv_prefix(), id)
    }

    fn kv_err(e: KVError) -> ServiceError {
        match e {
            KVError::Storage(msg) => ServiceError::Storage(msg),
            KVError::Serialization(msg) => ServiceError::Internal(msg),
        }
    }

    fn decode(bytes: &[u8]) -> Result<T, ServiceError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::Internal(format!("deserialize {}: {}", T::RESOURCE, e)))
    }

    fn encode(record: &T) -> Result<Vec<u8>, ServiceError> {
        serde_json::to_vec(record)
            .map_err(|e| ServiceError::Internal(format!("serialize {}: {}", T::RESOURCE, e)))
    }

    /// Get a record by key value. Returns None if not found.
    pub fn get(&self, id: &str) -> Result<Option<T>, ServiceError> {
        let key = Self::make_key(id);
        match self.kv.get(&key).map_err(Self::kv_err)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get a record or return NotFound error.
    pub fn get_or_err(&self, id: &str) -> Result<T, ServiceError> {
        self.get(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("{} '{}' not found", T::RESOURCE, id)))
    }

    /// List all records with this prefix, in key order.
    pub fn list(&self) -> Result<Vec<T>, ServiceError> {
        self.find(|_| true)
    }

    /// List the records accepted by `filter`.
    pub fn find<F>(&self, filter: F) -> Result<Vec<T>, ServiceError>
    where
        F: Fn(&T) -> bool,
    {
        let entries = self.kv.scan(T::kv_prefix()).map_err(Self::kv_err)?;
        let mut records = Vec::with_capacity(entries.len());
        for (_key, bytes) in entries {
            let record = Self::decode(&bytes)?;
            if filter(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Insert a new record. Fails with Conflict if the key is taken.
    pub fn insert(&self, mut record: T) -> Result<T, ServiceError> {
        record.before_write();

        let id = record.key_value();
        let bytes = Self::encode(&record)?;
        let inserted = self
            .kv
            .insert_new(&Self::make_key(&id), &bytes)
            .map_err(Self::kv_err)?;
        if !inserted {
            return Err(ServiceError::Conflict(format!(
                "{} '{}' already exists",
                T::RESOURCE,
                id
            )));
        }

        Ok(record)
    }

    /// Write a record whether or not its key exists.
    /// Returns the stored record and `true` if an existing one was replaced.
    pub fn upsert(&self, mut record: T) -> Result<(T, bool), ServiceError> {
        record.before_write();

        let id = record.key_value();
        let bytes = Self::encode(&record)?;
        let replaced = self
            .kv
            .set(&Self::make_key(&id), &bytes)
            .map_err(Self::kv_err)?;
        debug!(resource = T::RESOURCE, %id, replaced, "upsert");

        Ok((record, replaced))
    }

    /// Replace an existing record. Fails with NotFound if the key is absent.
    pub fn replace(&self, record: T) -> Result<T, ServiceError> {
        self.get_or_err(&record.key_value())?;
        let (record, _) = self.upsert(record)?;
        Ok(record)
    }

    /// Delete a record by key value.
    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let removed = self.kv.delete(&Self::make_key(id)).map_err(Self::kv_err)?;
        if !removed {
            return Err(ServiceError::NotFound(format!(
                "{} '{}' not found",
                T::RESOURCE,
                id
            )));
        }
        Ok(())
    }
}
