//! Typed document collections on top of the KV boundary.

pub mod kv;

pub use kv::{key_part, KvOps, KvRecord};
