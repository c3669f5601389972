use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use fleetwatch_core::ServiceError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::dispatch::Dispatcher;
use crate::matcher::truncate_to_minute;

/// Periodic trigger around [`Dispatcher`].
///
/// Ticks may arrive more often than once a minute. The driver remembers the
/// minute each job last fired in, so a job fires at most once per matching
/// minute no matter how many ticks land in it.
pub struct DispatchDriver {
    dispatcher: Arc<Dispatcher>,
    fired: Mutex<HashMap<String, NaiveDateTime>>,
}

impl DispatchDriver {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            fired: Mutex::new(HashMap::new()),
        }
    }

    /// Run one pass at `now`. Returns the number of units dispatched.
    pub fn tick(&self, now: NaiveDateTime) -> Result<usize, ServiceError> {
        let minute = truncate_to_minute(now);
        let due = self.dispatcher.catalog().due_jobs(minute)?;

        let mut fired = self.fired.lock().unwrap_or_else(|e| e.into_inner());
        fired.retain(|_, at| *at == minute);

        let fresh: Vec<_> = due
            .into_iter()
            .filter(|job| !fired.contains_key(&job.id))
            .collect();
        if fresh.is_empty() {
            debug!(%minute, "nothing new to dispatch");
            return Ok(0);
        }

        let outcome = self.dispatcher.dispatch_jobs(&fresh, minute)?;
        for job in &fresh {
            fired.insert(job.id.clone(), minute);
        }
        Ok(outcome.units.len())
    }
}

/// Start the background dispatch loop, evaluating in local time every `tick`.
///
/// Returns a CancellationToken that stops the loop when cancelled.
pub fn start(driver: Arc<DispatchDriver>, tick: Duration) -> CancellationToken {
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            info!("schedule dispatch driver started (tick={tick:?})");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("schedule dispatch driver stopped");
                        break;
                    }
                    _ = tokio::time::sleep(tick) => {
                        match driver.tick(Local::now().naive_local()) {
                            Ok(0) => {}
                            Ok(n) => info!("dispatch driver: dispatched {n} units"),
                            Err(e) => error!("dispatch driver error: {e}"),
                        }
                    }
                }
            }
        });
    }

    cancel
}

#[cfg(test)]
mod tests {
    use super::*;

    use fleetwatch_core::FleetMembers;
    use fleetwatch_kv::{KVStore, RedbStore};

    use crate::catalog::ScheduleCatalog;
    use crate::dispatch::FleetDirectory;
    use crate::model::{DispatchUnit, JobRequest};

    struct NoFleet;

    impl FleetDirectory for NoFleet {
        fn known_fleet(&self) -> Result<FleetMembers, ServiceError> {
            Ok(FleetMembers::default())
        }
    }

    type Executed = Arc<Mutex<Vec<DispatchUnit>>>;

    fn setup(job: serde_json::Value) -> (Arc<DispatchDriver>, Executed, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let kv: Arc<dyn KVStore> =
            Arc::new(RedbStore::open(&dir.path().join("worker.redb")).unwrap());
        let catalog = Arc::new(ScheduleCatalog::new(kv));
        let req: JobRequest = serde_json::from_value(job).unwrap();
        catalog.register(req).unwrap();

        let executed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&executed);
        let dispatcher = Dispatcher::new(
            catalog,
            Arc::new(NoFleet),
            Arc::new(move |unit: &DispatchUnit| sink.lock().unwrap().push(unit.clone())),
        );
        (Arc::new(DispatchDriver::new(Arc::new(dispatcher))), executed, dir)
    }

    fn backup_at_ten() -> serde_json::Value {
        serde_json::json!({
            "name": "backup", "active": true, "times": ["10:00"], "location": "/bkp",
            "terminals": ["T1"], "branches": ["B1", "B2"],
        })
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn fast_ticks_fire_once_per_minute() {
        let (driver, executed, _dir) = setup(backup_at_ten());

        assert_eq!(driver.tick(at("2024-05-01 10:00:00")).unwrap(), 2);
        assert_eq!(driver.tick(at("2024-05-01 10:00:15")).unwrap(), 0);
        assert_eq!(driver.tick(at("2024-05-01 10:00:45")).unwrap(), 0);
        assert_eq!(driver.tick(at("2024-05-01 10:01:00")).unwrap(), 0);
        assert_eq!(executed.lock().unwrap().len(), 2);

        // Same wall-clock minute on the next day fires again.
        assert_eq!(driver.tick(at("2024-05-02 10:00:30")).unwrap(), 2);
        assert_eq!(executed.lock().unwrap().len(), 4);
    }

    #[test]
    fn dispatch_time_is_truncated_to_minute() {
        let (driver, executed, _dir) = setup(backup_at_ten());
        driver.tick(at("2024-05-01 10:00:42")).unwrap();
        let units = executed.lock().unwrap();
        assert!(units.iter().all(|u| u.dispatch_time == at("2024-05-01 10:00:00")));
    }

    #[tokio::test]
    async fn loop_dispatches_then_exits_on_cancel() {
        // Due every minute, so the first tick of the loop dispatches.
        let (driver, executed, _dir) = setup(serde_json::json!({
            "name": "heartbeat", "active": true, "interval_minutes": 1, "location": "/hb",
            "terminals": ["T1"], "branches": ["B1"],
        }));
        let cancel = start(Arc::clone(&driver), Duration::from_millis(10));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while executed.lock().unwrap().is_empty() {
            assert!(tokio::time::Instant::now() < deadline, "loop never dispatched");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        cancel.cancel();
        // The spawned loop owns the other reference; it is dropped once the task ends.
        while Arc::strong_count(&driver) > 1 {
            assert!(tokio::time::Instant::now() < deadline, "loop kept running after cancel");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(Arc::strong_count(&driver), 1);
    }
}
