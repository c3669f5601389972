use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Acknowledgment body returned by write endpoints: `{"msg": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub msg: String,
}

impl Ack {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Branches and terminals known to have reported at least once.
///
/// Dispatch uses it in place of a job's target list when that list is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetMembers {
    pub branches: BTreeSet<String>,
    pub terminals: BTreeSet<String>,
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
        assert_ne!(id, new_id());
    }

    #[test]
    fn test_now_rfc3339() {
        let ts = now_rfc3339();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn ack_serializes_as_msg() {
        let json = serde_json::to_value(Ack::new("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"msg": "ok"}));
    }
}
