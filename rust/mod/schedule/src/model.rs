use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use fleetwatch_core::ServiceError;

// ---------------------------------------------------------------------------
// ScheduledJob: catalog entry
// ---------------------------------------------------------------------------

/// A named, time-triggered file execution targeting part of the fleet.
///
/// Trigger modes are alternatives and need not co-occur:
///
/// ```text
/// times             ["10:00", "22:30"]  exact HH:MM match
/// interval_minutes  30                  every 30 min from local midnight
/// days / months     [1, 15] / [6]       day filters (conjunctive)
/// interval_days     2                   every 2nd day since 1970-01-01
/// ```
///
/// Empty `terminals` / `branches` mean "every known one".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: String,
    pub name: String,
    pub active: bool,
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default)]
    pub interval_minutes: u32,
    #[serde(default)]
    pub days: Vec<u32>,
    #[serde(default)]
    pub months: Vec<u32>,
    #[serde(default)]
    pub interval_days: u32,
    pub location: String,
    #[serde(default)]
    pub terminals: Vec<String>,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ScheduledJob {
    /// Whether the job fires on some minute of the day (times or interval).
    pub fn has_minute_trigger(&self) -> bool {
        !self.times.is_empty() || self.interval_minutes > 0
    }
}

// ---------------------------------------------------------------------------
// JobRequest: body of register / update
// ---------------------------------------------------------------------------

/// Body for `POST /schedules` and `PUT /schedules/{id}`.
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation error instead of a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobRequest {
    #[serde(default, alias = "nome")]
    pub name: Option<String>,
    #[serde(default, alias = "ativo")]
    pub active: Option<bool>,
    #[serde(default, alias = "horario")]
    pub times: Option<Vec<String>>,
    #[serde(default, alias = "intervalo")]
    pub interval_minutes: Option<u32>,
    #[serde(default, alias = "dia")]
    pub days: Option<Vec<u32>>,
    #[serde(default, alias = "mes")]
    pub months: Option<Vec<u32>>,
    #[serde(default, alias = "intervalo_dias")]
    pub interval_days: Option<u32>,
    #[serde(default, alias = "local")]
    pub location: Option<String>,
    #[serde(default, alias = "terminal")]
    pub terminals: Option<Vec<String>>,
    #[serde(default, alias = "filial")]
    pub branches: Option<Vec<String>>,
}

impl JobRequest {
    /// Validate the request and build the catalog entry stored under `id`.
    pub fn into_job(self, id: String) -> Result<ScheduledJob, ServiceError> {
        let name = match self.name {
            Some(n) if !n.trim().is_empty() => n,
            _ => return Err(ServiceError::Validation("name is required".into())),
        };
        let active = self
            .active
            .ok_or_else(|| ServiceError::Validation("active is required".into()))?;
        let location = match self.location {
            Some(l) if !l.trim().is_empty() => l,
            _ => return Err(ServiceError::Validation("location is required".into())),
        };

        let times = self.times.unwrap_or_default();
        for t in &times {
            if parse_hhmm(t).is_none() {
                return Err(ServiceError::Validation(format!(
                    "invalid time '{t}', expected zero-padded HH:MM"
                )));
            }
        }
        let days = self.days.unwrap_or_default();
        if let Some(d) = days.iter().find(|d| !(1..=31).contains(*d)) {
            return Err(ServiceError::Validation(format!("invalid day of month {d}")));
        }
        let months = self.months.unwrap_or_default();
        if let Some(m) = months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(ServiceError::Validation(format!("invalid month {m}")));
        }

        let job = ScheduledJob {
            id,
            name,
            active,
            times,
            interval_minutes: self.interval_minutes.unwrap_or(0),
            days,
            months,
            interval_days: self.interval_days.unwrap_or(0),
            location,
            terminals: self.terminals.unwrap_or_default(),
            branches: self.branches.unwrap_or_default(),
            created_at: String::new(),
            updated_at: String::new(),
        };

        let has_trigger = job.has_minute_trigger()
            || !job.days.is_empty()
            || !job.months.is_empty()
            || job.interval_days > 0;
        if !has_trigger {
            return Err(ServiceError::Validation(
                "at least one trigger is required (times, interval_minutes, days, months, interval_days)"
                    .into(),
            ));
        }

        Ok(job)
    }
}

/// Parse a strict zero-padded 24-hour `HH:MM` string into (hour, minute).
pub fn parse_hhmm(s: &str) -> Option<(u32, u32)> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    if !bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit) {
        return None;
    }
    let hour: u32 = s[..2].parse().ok()?;
    let minute: u32 = s[3..].parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

// ---------------------------------------------------------------------------
// DispatchUnit: ephemeral fanout product
// ---------------------------------------------------------------------------

/// One (job, branch, terminal) execution produced by fanout at an instant.
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DispatchUnit {
    pub job_name: String,
    pub branch: String,
    pub terminal: String,
    pub dispatch_time: NaiveDateTime,
    pub job_id: String,
    pub location: String,
}
