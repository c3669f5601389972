//! KvRecord implementations for status models.

use fleetwatch_store::{key_part, KvRecord};

use crate::model::BranchStatus;

impl KvRecord for BranchStatus {
    const RESOURCE: &'static str = "branch status";

    fn kv_prefix() -> &'static str {
        "status:branch:"
    }

    fn key_value(&self) -> String {
        BranchStatus::key_of(&self.branch_id, &self.terminal_id)
    }
}

impl BranchStatus {
    /// Composite store key for a (branch, terminal) pair.
    pub fn key_of(branch_id: &str, terminal_id: &str) -> String {
        format!("{}:{}", key_part(branch_id), key_part(terminal_id))
    }
}
