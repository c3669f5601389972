use crate::error::KVError;

/// KVStore is the document store boundary: opaque byte values under
/// namespaced string keys.
///
/// Keys follow the `{module}:{resource}:{id}` convention, e.g.
/// `status:branch:B1:T1` or `schedule:job:3f2a...`. Every write is a single
/// transaction, so a value is never observed half-written.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Write a value, replacing whatever was stored under the key.
    /// Returns `true` if an existing value was replaced, `false` on insert.
    fn set(&self, key: &str, value: &[u8]) -> Result<bool, KVError>;

    /// Write a value only if the key is absent. Returns `false` (and writes
    /// nothing) when the key already exists.
    fn insert_new(&self, key: &str, value: &[u8]) -> Result<bool, KVError>;

    /// Delete a key. Returns `true` if something was removed.
    fn delete(&self, key: &str) -> Result<bool, KVError>;

    /// Scan all keys matching a prefix. Returns (key, value) pairs sorted by key.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
