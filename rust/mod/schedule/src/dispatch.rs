use std::sync::Arc;

use chrono::NaiveDateTime;
use fleetwatch_core::{FleetMembers, ServiceError};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::ScheduleCatalog;
use crate::executor::Executor;
use crate::fanout::fanout;
use crate::matcher::truncate_to_minute;
use crate::model::{DispatchUnit, ScheduledJob};

/// Source of the branch/terminal universe used for jobs with empty targets.
pub trait FleetDirectory: Send + Sync {
    fn known_fleet(&self) -> Result<FleetMembers, ServiceError>;
}

/// Result of one matching + fanout pass.
///
/// An empty outcome means nothing was due: a normal result, not a failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchOutcome {
    pub due_jobs: usize,
    pub units: Vec<DispatchUnit>,
}

impl DispatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Runs matching + fanout passes and hands the units to the executor.
pub struct Dispatcher {
    catalog: Arc<ScheduleCatalog>,
    fleet: Arc<dyn FleetDirectory>,
    executor: Arc<dyn Executor>,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<ScheduleCatalog>,
        fleet: Arc<dyn FleetDirectory>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            catalog,
            fleet,
            executor,
        }
    }

    pub fn catalog(&self) -> &Arc<ScheduleCatalog> {
        &self.catalog
    }

    /// Match the catalog at the minute containing `now`, fan out every due
    /// job and execute the units.
    pub fn run_pass(&self, now: NaiveDateTime) -> Result<DispatchOutcome, ServiceError> {
        let now = truncate_to_minute(now);
        let due = self.catalog.due_jobs(now)?;
        self.dispatch_jobs(&due, now)
    }

    /// Fan out `jobs` at the minute containing `now` and execute the
    /// resulting units.
    ///
    /// All units are resolved before the first one is executed, so a failing
    /// fleet lookup executes nothing.
    pub fn dispatch_jobs(
        &self,
        jobs: &[ScheduledJob],
        now: NaiveDateTime,
    ) -> Result<DispatchOutcome, ServiceError> {
        let now = truncate_to_minute(now);
        if jobs.is_empty() {
            debug!(%now, "no jobs due");
            return Ok(DispatchOutcome::default());
        }

        let units = self.plan(jobs, now)?;
        for unit in &units {
            self.executor.execute(unit);
        }
        info!(%now, jobs = jobs.len(), units = units.len(), "dispatch pass complete");

        Ok(DispatchOutcome {
            due_jobs: jobs.len(),
            units,
        })
    }

    fn plan(
        &self,
        jobs: &[ScheduledJob],
        now: NaiveDateTime,
    ) -> Result<Vec<DispatchUnit>, ServiceError> {
        let needs_fleet = jobs
            .iter()
            .any(|job| job.terminals.is_empty() || job.branches.is_empty());
        let fleet = if needs_fleet {
            self.fleet.known_fleet()?
        } else {
            FleetMembers::default()
        };

        Ok(jobs
            .iter()
            .flat_map(|job| fanout(job, &fleet, now))
            .collect())
    }
}
