//! Interval-based job scheduling.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use cadence_core::config::ScheduleConfig;

/// The orchestrator's job kinds. Backfill is manually triggered and never
/// becomes due on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    WeeklyLearning,
    DailyHealth,
    Backfill,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::WeeklyLearning => "weekly_learning",
            JobKind::DailyHealth => "daily_health",
            JobKind::Backfill => "backfill",
        }
    }
}

/// Tracks when each interval job last ran and reports which are due.
///
/// A job with no recorded run is immediately due, so a fresh deployment
/// learns on first tick instead of waiting a full interval.
pub struct Scheduler {
    weekly_interval: Duration,
    daily_interval: Duration,
    last_run: HashMap<JobKind, DateTime<Utc>>,
}

impl Scheduler {
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            weekly_interval: Duration::seconds(config.weekly_interval_secs as i64),
            daily_interval: Duration::seconds(config.daily_interval_secs as i64),
            last_run: HashMap::new(),
        }
    }

    /// Interval jobs whose time has come, in a fixed order.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<JobKind> {
        [
            (JobKind::WeeklyLearning, self.weekly_interval),
            (JobKind::DailyHealth, self.daily_interval),
        ]
        .into_iter()
        .filter(|(kind, interval)| match self.last_run.get(kind) {
            Some(last) => now - *last >= *interval,
            None => true,
        })
        .map(|(kind, _)| kind)
        .collect()
    }

    pub fn mark_ran(&mut self, kind: JobKind, now: DateTime<Utc>) {
        self.last_run.insert(kind, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_scheduler_has_everything_due() {
        let scheduler = Scheduler::new(&ScheduleConfig::default());
        let due = scheduler.due(Utc::now());
        assert_eq!(due, vec![JobKind::WeeklyLearning, JobKind::DailyHealth]);
    }

    #[test]
    fn marked_jobs_wait_out_their_interval() {
        let mut scheduler = Scheduler::new(&ScheduleConfig::default());
        let t0 = Utc::now();
        scheduler.mark_ran(JobKind::WeeklyLearning, t0);
        scheduler.mark_ran(JobKind::DailyHealth, t0);

        assert!(scheduler.due(t0 + Duration::hours(1)).is_empty());
        assert_eq!(
            scheduler.due(t0 + Duration::days(1)),
            vec![JobKind::DailyHealth]
        );
        assert_eq!(
            scheduler.due(t0 + Duration::days(7)),
            vec![JobKind::WeeklyLearning, JobKind::DailyHealth]
        );
    }

    #[test]
    fn backfill_is_never_due_by_interval() {
        let scheduler = Scheduler::new(&ScheduleConfig::default());
        assert!(!scheduler
            .due(Utc::now() + Duration::days(365))
            .contains(&JobKind::Backfill));
    }
}
