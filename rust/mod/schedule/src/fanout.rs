//! Expansion of a due job into (job, branch, terminal) dispatch units.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use fleetwatch_core::FleetMembers;

use crate::model::{DispatchUnit, ScheduledJob};

/// Cross product of the job's terminals and branches, each pair stamped with
/// `at`. Empty target lists resolve to the whole known fleet; duplicate
/// targets collapse. If either side resolves to nothing the result is empty.
pub fn fanout(job: &ScheduledJob, fleet: &FleetMembers, at: NaiveDateTime) -> Vec<DispatchUnit> {
    let terminals = resolve(&job.terminals, &fleet.terminals);
    let branches = resolve(&job.branches, &fleet.branches);

    let mut units = Vec::with_capacity(terminals.len() * branches.len());
    for terminal in &terminals {
        for branch in &branches {
            units.push(DispatchUnit {
                job_name: job.name.clone(),
                branch: (*branch).to_string(),
                terminal: (*terminal).to_string(),
                dispatch_time: at,
                job_id: job.id.clone(),
                location: job.location.clone(),
            });
        }
    }
    units
}

fn resolve<'a>(targets: &'a [String], known: &'a BTreeSet<String>) -> BTreeSet<&'a str> {
    if targets.is_empty() {
        known.iter().map(String::as_str).collect()
    } else {
        targets.iter().map(String::as_str).collect()
    }
}
