use std::sync::Arc;

use chrono::NaiveDateTime;
use fleetwatch_core::{new_id, ServiceError};
use fleetwatch_kv::KVStore;
use fleetwatch_store::KvOps;
use tracing::info;

use crate::matcher;
use crate::model::{JobRequest, ScheduledJob};

/// Persistent set of scheduled jobs.
///
/// The matcher only reads from it; registration and the administrative
/// update/remove calls are the only writers.
pub struct ScheduleCatalog {
    jobs: KvOps<ScheduledJob>,
}

impl ScheduleCatalog {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            jobs: KvOps::new(kv),
        }
    }

    /// Validate and store a new job under a fresh entry id.
    pub fn register(&self, req: JobRequest) -> Result<ScheduledJob, ServiceError> {
        let job = self.jobs.insert(req.into_job(new_id())?)?;
        info!(id = %job.id, name = %job.name, active = job.active, "job registered");
        Ok(job)
    }

    /// Jobs with `active = true`.
    pub fn list_active(&self) -> Result<Vec<ScheduledJob>, ServiceError> {
        self.jobs.find(|job| job.active)
    }

    /// Every job, active or not.
    pub fn list(&self) -> Result<Vec<ScheduledJob>, ServiceError> {
        self.jobs.list()
    }

    pub fn get(&self, id: &str) -> Result<ScheduledJob, ServiceError> {
        self.jobs.get_or_err(id)
    }

    /// Replace the definition of an existing job. Same validation as register.
    pub fn update(&self, id: &str, req: JobRequest) -> Result<ScheduledJob, ServiceError> {
        let existing = self.jobs.get_or_err(id)?;
        let mut job = req.into_job(existing.id)?;
        job.created_at = existing.created_at;
        let job = self.jobs.replace(job)?;
        info!(id = %job.id, name = %job.name, active = job.active, "job updated");
        Ok(job)
    }

    pub fn remove(&self, id: &str) -> Result<(), ServiceError> {
        self.jobs.delete(id)?;
        info!(%id, "job removed");
        Ok(())
    }

    /// Active jobs due at `now`. Reads a snapshot; writes nothing.
    pub fn due_jobs(&self, now: NaiveDateTime) -> Result<Vec<ScheduledJob>, ServiceError> {
        Ok(matcher::due_jobs(&self.list_active()?, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetwatch_kv::RedbStore;

    fn test_catalog() -> (ScheduleCatalog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let kv: Arc<dyn KVStore> =
            Arc::new(RedbStore::open(&dir.path().join("catalog.redb")).unwrap());
        (ScheduleCatalog::new(kv), dir)
    }

    fn request(value: serde_json::Value) -> JobRequest {
        serde_json::from_value(value).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn backup_due_at_ten_only() {
        let (catalog, _dir) = test_catalog();
        catalog
            .register(request(serde_json::json!({
                "name": "backup", "active": true, "horario": ["10:00"],
                "local": "/bkp", "terminal": ["T1"], "filial": ["B1"],
            })))
            .unwrap();

        let due = catalog.due_jobs(at("2024-05-01 10:00")).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "backup");
        assert!(catalog.due_jobs(at("2024-05-01 10:01")).unwrap().is_empty());
    }

    #[test]
    fn inactive_jobs_hidden_from_active_listing() {
        let (catalog, _dir) = test_catalog();
        catalog
            .register(request(serde_json::json!({
                "name": "on", "active": true, "times": ["10:00"], "location": "/a",
            })))
            .unwrap();
        catalog
            .register(request(serde_json::json!({
                "name": "off", "active": false, "times": ["10:00"], "location": "/b",
            })))
            .unwrap();

        assert_eq!(catalog.list().unwrap().len(), 2);
        let active = catalog.list_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "on");

        let due = catalog.due_jobs(at("2024-05-01 10:00")).unwrap();
        assert!(due.iter().all(|j| j.name != "off"));
    }

    #[test]
    fn same_name_registers_twice() {
        let (catalog, _dir) = test_catalog();
        let body = serde_json::json!({
            "name": "sync", "active": true, "times": ["01:00"], "location": "/s",
        });
        let a = catalog.register(request(body.clone())).unwrap();
        let b = catalog.register(request(body)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(catalog.list().unwrap().len(), 2);
    }

    #[test]
    fn invalid_registration_stores_nothing() {
        let (catalog, _dir) = test_catalog();
        let err = catalog
            .register(request(serde_json::json!({"name": "x", "active": true, "times": ["10:00"]})))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn update_and_remove() {
        let (catalog, _dir) = test_catalog();
        let job = catalog
            .register(request(serde_json::json!({
                "name": "report", "active": true, "times": ["08:00"], "location": "/r",
            })))
            .unwrap();

        let updated = catalog
            .update(
                &job.id,
                request(serde_json::json!({
                    "name": "report", "active": false, "times": ["09:00"], "location": "/r2",
                })),
            )
            .unwrap();
        assert_eq!(updated.id, job.id);
        assert_eq!(updated.created_at, job.created_at);
        assert!(!updated.active);
        assert_eq!(catalog.get(&job.id).unwrap().location, "/r2");
        assert!(catalog.list_active().unwrap().is_empty());

        catalog.remove(&job.id).unwrap();
        assert!(matches!(catalog.get(&job.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (catalog, _dir) = test_catalog();
        let body = serde_json::json!({
            "name": "n", "active": true, "times": ["08:00"], "location": "/r",
        });
        assert!(matches!(
            catalog.update("missing", request(body)),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(catalog.remove("missing"), Err(ServiceError::NotFound(_))));
    }
}
