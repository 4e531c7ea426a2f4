//! Daily sweep scheduling.
//!
//! Each job fires once per day at its configured UTC time. Sweeps are
//! idempotent, so a missed window is simply caught up on the next firing;
//! there is no missed-run bookkeeping.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{error, info};

use fintra_core::budget::BudgetAlertEngine;
use fintra_core::goal::GoalProgressEngine;
use fintra_core::recurring::RecurringSweep;
use fintra_shared::config::SchedulerConfig;

/// Runs the three daily jobs forever.
pub async fn run_daily_jobs(
    schedule: SchedulerConfig,
    alerts: BudgetAlertEngine,
    goals: GoalProgressEngine,
    recurring: RecurringSweep,
) {
    info!(
        budget_check = %schedule.budget_check,
        recurring_generation = %schedule.recurring_generation,
        goal_expiry = %schedule.goal_expiry,
        "scheduler started"
    );

    let budget_job = tokio::spawn(daily(schedule.budget_check, move || {
        let alerts = alerts.clone();
        async move {
            match alerts.sweep().await {
                Ok(reconciled) => info!(reconciled, "budget sweep done"),
                Err(e) => error!(error = %e, "budget sweep failed"),
            }
        }
    }));

    let recurring_job = tokio::spawn(daily(schedule.recurring_generation, move || {
        let recurring = recurring.clone();
        async move {
            match recurring.run().await {
                Ok(report) => info!(
                    created = report.created,
                    skipped = report.skipped,
                    failed = report.failed,
                    "recurring sweep done"
                ),
                Err(e) => error!(error = %e, "recurring sweep failed"),
            }
        }
    }));

    let expiry_job = tokio::spawn(daily(schedule.goal_expiry, move || {
        let goals = goals.clone();
        async move {
            match goals.sweep_expired().await {
                Ok(processed) => info!(processed, "goal expiry sweep done"),
                Err(e) => error!(error = %e, "goal expiry sweep failed"),
            }
        }
    }));

    // The jobs only end if a task panics; surface that instead of hanging.
    let _ = tokio::try_join!(budget_job, recurring_job, expiry_job);
    error!("a scheduler job exited unexpectedly");
}

/// Fires `job` every day at `at` (UTC).
async fn daily<F, Fut>(at: NaiveTime, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        tokio::time::sleep(until_next(Utc::now(), at)).await;
        job().await;
    }
}

/// Time remaining until the next daily occurrence of `at`.
fn until_next(now: DateTime<Utc>, at: NaiveTime) -> Duration {
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}
