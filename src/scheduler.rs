//! Background task that generates the monthly report
//!
//! Fires once per calendar month at the `[scheduler]` day/hour/minute from
//! config.toml (UTC) and generates the draft report for the month that just
//! ended. Finalization is never automatic.
//!
//! A failed run is logged and abandoned. The next firing is not a retry of it.
//! Runs never overlap: a firing that arrives while a previous run is still
//! executing is skipped.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::app::SchedulerConfig;
use crate::core::{period::Period, report};
use crate::entities::monthly_report;
use crate::errors::{Error, Result};

/// The firing instant inside `period`.
fn fire_instant(period: Period, schedule: &SchedulerConfig) -> Result<DateTime<Utc>> {
    let offset = TimeDelta::try_days(i64::from(schedule.day) - 1)
        .zip(TimeDelta::try_hours(i64::from(schedule.hour)))
        .zip(TimeDelta::try_minutes(i64::from(schedule.minute)))
        .map(|((d, h), m)| d + h + m)
        .ok_or_else(|| Error::Config {
            message: "Schedule offset out of range".to_string(),
        })?;
    Ok(period.start()? + offset)
}

/// First firing instant strictly after `now`.
pub fn next_fire_after(now: DateTime<Utc>, schedule: &SchedulerConfig) -> Result<DateTime<Utc>> {
    schedule.validate()?;
    let current = Period::containing(now);
    let candidate = fire_instant(current, schedule)?;
    if candidate > now {
        Ok(candidate)
    } else {
        fire_instant(current.next(), schedule)
    }
}

/// The month a run at `instant` reports on: the one before it.
pub fn target_period(instant: DateTime<Utc>) -> Period {
    Period::containing(instant).previous()
}

/// Clears the running flag when a run ends, including on early return.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Generates one user's monthly reports on a schedule.
#[derive(Debug, Clone)]
pub struct ReportScheduler {
    db: Arc<DatabaseConnection>,
    user_id: i64,
    schedule: SchedulerConfig,
    running: Arc<AtomicBool>,
}

impl ReportScheduler {
    /// Creates a scheduler for `user_id`. Nothing runs until [`Self::start`] or a manual call.
    pub fn new(db: Arc<DatabaseConnection>, user_id: i64, schedule: SchedulerConfig) -> Self {
        Self {
            db,
            user_id,
            schedule,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a run is currently executing.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(Arc::clone(&self.running)))
    }

    async fn run_for(&self, period: Period) -> Option<Result<monthly_report::Model>> {
        let Some(_guard) = self.try_acquire() else {
            warn!("Report run for {} skipped: previous run still executing", period);
            return None;
        };
        info!("Generating monthly report for {}", period);
        Some(report::generate_report(&self.db, self.user_id, period.year(), period.month()).await)
    }

    /// Scheduled firing at `at`: generates the report for the month before `at`.
    ///
    /// Returns `None` when skipped because another run holds the guard.
    pub async fn fire(&self, at: DateTime<Utc>) -> Option<Result<monthly_report::Model>> {
        self.run_for(target_period(at)).await
    }

    /// Ad-hoc run: generates the report for the month containing `at`.
    pub async fn run_manual(&self, at: DateTime<Utc>) -> Option<Result<monthly_report::Model>> {
        self.run_for(Period::containing(at)).await
    }

    /// Spawns the background loop on the tokio runtime.
    ///
    /// Each firing runs in its own task so a slow run cannot delay the clock. The
    /// firing after `next` is computed from `next` itself rather than from the wall
    /// clock, so waking slightly early can never fire the same cycle twice.
    pub fn start(self) -> JoinHandle<()> {
        info!(
            "Starting report scheduler: day {} at {:02}:{:02} UTC",
            self.schedule.day, self.schedule.hour, self.schedule.minute
        );

        tokio::spawn(async move {
            let mut next = match next_fire_after(Utc::now(), &self.schedule) {
                Ok(next) => next,
                Err(e) => {
                    error!("Report scheduler stopped: {}", e);
                    return;
                }
            };
            loop {
                info!("Next monthly report run at {}", next);
                let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                tokio::time::sleep(wait).await;

                let scheduler = self.clone();
                let fired_at = next;
                tokio::spawn(async move {
                    match scheduler.fire(fired_at).await {
                        Some(Ok(report)) => info!(
                            report_id = report.id,
                            "Scheduled report for {}/{:02} completed",
                            report.year,
                            report.month
                        ),
                        Some(Err(e)) => error!("Scheduled report run failed: {}", e),
                        None => {}
                    }
                });

                next = match next_fire_after(fired_at, &self.schedule) {
                    Ok(following) => following,
                    Err(e) => {
                        error!("Report scheduler stopped: {}", e);
                        return;
                    }
                };
            }
        })
    }
}
