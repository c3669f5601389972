use std::sync::Arc;

use fleetwatch_core::{now_rfc3339, FleetMembers, ServiceError};
use fleetwatch_kv::KVStore;
use fleetwatch_store::KvOps;
use tracing::{debug, info};

use crate::model::{BranchStatus, ReportOutcome, StatusReport};

/// Merges inbound status reports into the per-(branch, terminal) store.
pub struct ReconciliationService {
    records: KvOps<BranchStatus>,
}

impl ReconciliationService {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            records: KvOps::new(kv),
        }
    }

    /// Apply one report: validate, fill defaults, then create or fully
    /// overwrite the record for its (branch, terminal).
    ///
    /// Validation happens before the store is touched. Exactly one write
    /// is issued per accepted report.
    pub fn report(&self, report: StatusReport) -> Result<ReportOutcome, ServiceError> {
        let record = report.into_record(now_rfc3339).inspect_err(|e| {
            debug!("status report rejected: {e}");
        })?;

        let (record, replaced) = self.records.upsert(record)?;
        info!(
            branch = %record.branch_id,
            terminal = %record.terminal_id,
            status = %record.status,
            created = !replaced,
            "status report stored"
        );

        Ok(ReportOutcome {
            record,
            created: !replaced,
        })
    }

    /// Full snapshot of every stored record, in store order.
    pub fn list(&self) -> Result<Vec<BranchStatus>, ServiceError> {
        self.records.list()
    }

    /// Look up the record of one (branch, terminal) pair.
    pub fn get(&self, branch_id: &str, terminal_id: &str) -> Result<BranchStatus, ServiceError> {
        self.records
            .get_or_err(&BranchStatus::key_of(branch_id, terminal_id))
    }

    /// Distinct branch and terminal ids currently known to the store.
    pub fn fleet_members(&self) -> Result<FleetMembers, ServiceError> {
        let mut members = FleetMembers::default();
        for record in self.records.list()? {
            members.branches.insert(record.branch_id);
            members.terminals.insert(record.terminal_id);
        }
        Ok(members)
    }
}
