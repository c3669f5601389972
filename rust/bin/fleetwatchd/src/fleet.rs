//! Bridges the status store into the dispatcher's fleet directory.

use std::sync::Arc;

use fleetwatch_core::{FleetMembers, ServiceError};
use schedule::dispatch::FleetDirectory;
use status::service::ReconciliationService;

/// The known fleet is every branch and terminal that has reported status.
pub struct StatusFleet {
    status: Arc<ReconciliationService>,
}

impl StatusFleet {
    pub fn new(status: Arc<ReconciliationService>) -> Self {
        Self { status }
    }
}

impl FleetDirectory for StatusFleet {
    fn known_fleet(&self) -> Result<FleetMembers, ServiceError> {
        self.status.fleet_members()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use fleetwatch_kv::{KVStore, RedbStore};
    use status::model::StatusReport;

    #[test]
    fn known_fleet_is_every_reporter() {
        let kv: Arc<dyn KVStore> = Arc::new(RedbStore::in_memory().unwrap());
        let status = Arc::new(ReconciliationService::new(kv));
        for (branch, terminal) in [("B1", "T1"), ("B2", "T1"), ("B2", "T2")] {
            let report: StatusReport =
                serde_json::from_value(serde_json::json!({"branch": branch, "terminal": terminal}))
                    .unwrap();
            status.report(report).unwrap();
        }

        let fleet = StatusFleet::new(status).known_fleet().unwrap();
        assert_eq!(fleet.branches.into_iter().collect::<Vec<_>>(), vec!["B1", "B2"]);
        assert_eq!(fleet.terminals.into_iter().collect::<Vec<_>>(), vec!["T1", "T2"]);
    }
}
