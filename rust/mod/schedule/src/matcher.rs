//! Pure "is this job due at this minute" evaluation.
//!
//! Matching never mutates a job and keeps no memory of earlier passes, so the
//! same snapshot evaluated at the same minute always yields the same jobs.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::model::ScheduledJob;

/// `NaiveDate::num_days_from_ce()` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Start of the minute containing `at`. Matching and dispatch stamps work at
/// minute resolution.
pub fn truncate_to_minute(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

/// The jobs of `jobs` that are due at `now`, in input order.
pub fn due_jobs(jobs: &[ScheduledJob], now: NaiveDateTime) -> Vec<ScheduledJob> {
    jobs.iter().filter(|job| is_due(job, now)).cloned().collect()
}

/// Whether `job` fires at the minute containing `now`.
///
/// A job is due when it is active, every day filter accepts the date, and
/// either a listed time or the minute interval hits the current minute.
/// Jobs with day filters only fire at 00:00.
pub fn is_due(job: &ScheduledJob, now: NaiveDateTime) -> bool {
    job.active && day_matches(job, now.date()) && minute_matches(job, now)
}

fn minute_matches(job: &ScheduledJob, now: NaiveDateTime) -> bool {
    let minute_of_day = now.hour() * 60 + now.minute();

    if !job.has_minute_trigger() {
        return minute_of_day == 0;
    }

    let hhmm = format!("{:02}:{:02}", now.hour(), now.minute());
    if job.times.iter().any(|t| *t == hhmm) {
        return true;
    }

    // Interval reference point: local midnight, reset every day.
    job.interval_minutes > 0 && minute_of_day % job.interval_minutes == 0
}

fn day_matches(job: &ScheduledJob, date: NaiveDate) -> bool {
    if !job.days.is_empty() && !job.days.contains(&date.day()) {
        return false;
    }
    if !job.months.is_empty() && !job.months.contains(&date.month()) {
        return false;
    }
    if job.interval_days > 0 {
        let epoch_day = i64::from(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE);
        if epoch_day.rem_euclid(i64::from(job.interval_days)) != 0 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn job(name: &str) -> ScheduledJob {
        ScheduledJob {
            id: name.into(),
            name: name.into(),
            active: true,
            times: vec![],
            interval_minutes: 0,
            days: vec![],
            months: vec![],
            interval_days: 0,
            location: "/bkp".into(),
            terminals: vec![],
            branches: vec![],
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn exact_time_match_only() {
        let backup = ScheduledJob {
            times: vec!["10:00".into()],
            ..job("backup")
        };
        assert!(is_due(&backup, at("2024-05-01", "10:00:00")));
        assert!(is_due(&backup, at("2024-05-01", "10:00:59")));
        assert!(!is_due(&backup, at("2024-05-01", "10:01:00")));
        assert!(!is_due(&backup, at("2024-05-01", "09:59:59")));
    }

    #[test]
    fn inactive_never_due() {
        let off = ScheduledJob {
            active: false,
            times: vec!["00:00".into(), "10:00".into()],
            interval_minutes: 1,
            ..job("off")
        };
        for time in ["00:00:00", "10:00:00", "13:37:00", "23:59:00"] {
            assert!(!is_due(&off, at("2024-05-01", time)));
        }
    }

    #[test]
    fn interval_counts_from_midnight() {
        let every_45 = ScheduledJob {
            interval_minutes: 45,
            ..job("every45")
        };
        assert!(is_due(&every_45, at("2024-05-01", "00:00:00")));
        assert!(is_due(&every_45, at("2024-05-01", "00:45:00")));
        assert!(is_due(&every_45, at("2024-05-01", "01:30:00")));
        assert!(!is_due(&every_45, at("2024-05-01", "01:00:00")));
        // 23:15 is minute 1395 = 31 * 45.
        assert!(is_due(&every_45, at("2024-05-01", "23:15:00")));
    }

    #[test]
    fn times_or_interval() {
        let mixed = ScheduledJob {
            times: vec!["07:13".into()],
            interval_minutes: 60,
            ..job("mixed")
        };
        assert!(is_due(&mixed, at("2024-05-01", "07:13:00")));
        assert!(is_due(&mixed, at("2024-05-01", "08:00:00")));
        assert!(!is_due(&mixed, at("2024-05-01", "08:13:00")));
    }

    #[test]
    fn day_and_month_filters() {
        let monthly = ScheduledJob {
            times: vec!["03:00".into()],
            days: vec![1, 15],
            months: vec![6, 12],
            ..job("monthly")
        };
        assert!(is_due(&monthly, at("2024-06-01", "03:00:00")));
        assert!(is_due(&monthly, at("2024-12-15", "03:00:00")));
        assert!(!is_due(&monthly, at("2024-06-02", "03:00:00")));
        assert!(!is_due(&monthly, at("2024-07-01", "03:00:00")));
    }

    #[test]
    fn day_filter_alone_fires_at_midnight() {
        let first_of_month = ScheduledJob {
            days: vec![1],
            ..job("first")
        };
        assert!(is_due(&first_of_month, at("2024-03-01", "00:00:00")));
        assert!(!is_due(&first_of_month, at("2024-03-01", "00:01:00")));
        assert!(!is_due(&first_of_month, at("2024-03-02", "00:00:00")));
    }

    #[test]
    fn interval_days_from_epoch() {
        let every_other_day = ScheduledJob {
            times: vec!["12:00".into()],
            interval_days: 2,
            ..job("alt")
        };
        // 1970-01-01 is epoch day 0; 2024-01-01 is epoch day 19723.
        assert!(is_due(&every_other_day, at("1970-01-01", "12:00:00")));
        assert!(!is_due(&every_other_day, at("2024-01-01", "12:00:00")));
        assert!(is_due(&every_other_day, at("2024-01-02", "12:00:00")));
    }

    #[test]
    fn matching_is_deterministic() {
        let jobs = vec![
            ScheduledJob {
                times: vec!["10:00".into()],
                ..job("a")
            },
            ScheduledJob {
                interval_minutes: 5,
                ..job("b")
            },
            ScheduledJob {
                times: vec!["11:00".into()],
                ..job("c")
            },
        ];
        let now = at("2024-05-01", "10:00:00");
        let first = due_jobs(&jobs, now);
        let second = due_jobs(&jobs, now);
        assert_eq!(first, second);
        let names: Vec<&str> = first.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn truncation_drops_seconds() {
        let t = NaiveDateTime::parse_from_str("2024-05-01 10:00:42.250", "%Y-%m-%d %H:%M:%S%.f")
            .unwrap();
        assert_eq!(truncate_to_minute(t), at("2024-05-01", "10:00:00"));
    }
}
