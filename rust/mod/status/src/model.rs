use serde::{Deserialize, Serialize};

use fleetwatch_core::ServiceError;

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_STATUS: &str = "OK";

// ---------------------------------------------------------------------------
// BranchStatus: one stored record per (branch, terminal)
// ---------------------------------------------------------------------------

/// Last known state of one terminal at one branch.
///
/// Identity is the `(branch_id, terminal_id)` pair. Every report for that pair
/// rewrites all other fields; nothing from the previous record survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStatus {
    #[serde(rename = "branch")]
    pub branch_id: String,
    #[serde(rename = "terminal")]
    pub terminal_id: String,
    #[serde(rename = "version")]
    pub software_version: String,
    pub status: String,
    pub detail: String,
    /// Source-supplied, or stamped by the server at write time (RFC 3339).
    pub last_execution: String,
}

// ---------------------------------------------------------------------------
// StatusReport: inbound heartbeat body
// ---------------------------------------------------------------------------

/// Body of `POST /report` (and its `/logs` alias).
///
/// The Portuguese field names sent by the branch agents are accepted as
/// aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusReport {
    #[serde(default, alias = "filial")]
    pub branch: Option<String>,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default, alias = "versao")]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "detalhe")]
    pub detail: Option<String>,
    #[serde(default, alias = "data", alias = "last_execution")]
    pub timestamp: Option<String>,
}

impl StatusReport {
    /// Check the key fields and build the full record, filling every absent
    /// field with its default. `stamp` supplies the server time when the
    /// report carries no timestamp.
    pub fn into_record<F>(self, stamp: F) -> Result<BranchStatus, ServiceError>
    where
        F: FnOnce() -> String,
    {
        let branch_id = required(self.branch, "branch")?;
        let terminal_id = required(self.terminal, "terminal")?;

        let last_execution = match self.timestamp {
            Some(ts) if !ts.trim().is_empty() => ts,
            _ => stamp(),
        };

        Ok(BranchStatus {
            branch_id,
            terminal_id,
            software_version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            detail: self.detail.unwrap_or_default(),
            last_execution,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(format!("{field} is required"))),
    }
}

/// Result of one reconciliation: the stored record and whether it is new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub record: BranchStatus,
    pub created: bool,
}
