//! The daily recurring-transaction sweep.
//!
//! Each recurring series is a *template* (no occurrence date) plus the dated
//! instances generated from it, all sharing a recurring-group ID. The sweep
//! is idempotent per (series, month): the existence check keys on the group
//! ID inside the current month, so running twice in a day, or late after
//! downtime, never duplicates an instance.

use chrono::Datelike;
use fintra_shared::AppResult;
use fintra_shared::types::{MonthKey, RecurringGroupId, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::budget::BudgetAlertEngine;
use crate::clock::Clock;
use crate::goal::GoalProgressEngine;
use crate::transaction::{NewTransaction, Transaction, TransactionKind, TransactionStore};

/// Outcome counts of one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Instances created this run.
    pub created: usize,
    /// Templates skipped (not due yet, or this month's instance exists).
    pub skipped: usize,
    /// Templates whose processing failed.
    pub failed: usize,
}

/// Materializes the current month's instance of every recurring template.
#[derive(Clone)]
pub struct RecurringSweep {
    transactions: Arc<dyn TransactionStore>,
    goal_progress: GoalProgressEngine,
    budget_alerts: BudgetAlertEngine,
    clock: Arc<dyn Clock>,
}

impl RecurringSweep {
    /// Creates the sweep with its collaborators.
    #[must_use]
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        goal_progress: GoalProgressEngine,
        budget_alerts: BudgetAlertEngine,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transactions,
            goal_progress,
            budget_alerts,
            clock,
        }
    }

    /// Runs one sweep over all templates.
    ///
    /// A failing template never aborts the rest of the sweep.
    pub async fn run(&self) -> AppResult<SweepReport> {
        let templates = self.transactions.templates().await?;
        let mut report = SweepReport::default();
        for template in templates {
            match self.process(&template).await {
                Ok(true) => report.created += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    warn!(template = %template.id, error = %e, "recurring sweep item failed");
                    report.failed += 1;
                }
            }
        }
        info!(
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            "recurring sweep finished"
        );
        Ok(report)
    }

    /// Processes one template; returns whether an instance was created.
    async fn process(&self, template: &Transaction) -> AppResult<bool> {
        let (Some(group), Some(day)) = (template.recurring_group, template.recurring_day) else {
            warn!(template = %template.id, "template missing recurring fields, skipping");
            return Ok(false);
        };

        let today = self.clock.today();
        let month = MonthKey::from_date(today);

        // Day 31 templates materialize on the 28th/29th/30th in short months.
        let trigger_day = month.clamp_day(day);
        if today.day() < trigger_day {
            return Ok(false);
        }

        // Catch-up: a late run still creates the instance, dated on the
        // trigger day rather than today.
        if self.transactions.instance_exists(group, month).await? {
            return Ok(false);
        }

        let instance = self
            .transactions
            .insert(NewTransaction {
                user_id: template.user_id,
                kind: template.kind,
                amount: template.amount,
                category: template.category.clone(),
                occurred_on: Some(month.date_on(trigger_day)),
                currency: template.currency.clone(),
                exchange_rate: template.exchange_rate,
                goal_id: template.goal_id,
                recurring_group: Some(group),
                recurring_day: template.recurring_day,
                note: template.note.clone(),
            })
            .await?;
        debug!(template = %template.id, instance = %instance.id, %month, "materialized recurring instance");

        // One appended fact: the incremental goal path is enough here, and
        // the new instance flows through the same budget recheck as any
        // user write.
        if instance.kind == TransactionKind::Expense {
            if let Some(goal) = instance.goal_id {
                // The instance row is already committed, so a failed
                // increment must not leave the goal stale until some
                // unrelated edit: fall back to the full recompute, which
                // re-reads the linked rows.
                if let Err(e) = self
                    .goal_progress
                    .record_contribution(goal, instance.base_amount())
                    .await
                {
                    warn!(instance = %instance.id, %goal, error = %e, "incremental goal update failed, recomputing");
                    self.goal_progress.recompute_by_id(goal).await?;
                }
            }
            self.budget_alerts.reconcile(instance.user_id).await?;
        }
        Ok(true)
    }

    /// Soft-stops a series: the template is deleted and historical instances
    /// become stand-alone transactions.
    pub async fn cancel_keep_history(&self, group: RecurringGroupId) -> AppResult<u64> {
        let detached = self.transactions.detach_series(group).await?;
        info!(%group, detached, "recurring series detached");
        Ok(detached)
    }

    /// Deletes an entire series including history, then recomputes every goal
    /// a deleted instance referenced and rechecks the owners' budgets.
    pub async fn cancel_and_purge(&self, group: RecurringGroupId) -> AppResult<u64> {
        let removed = self.transactions.purge_series(group).await?;

        let goals: BTreeSet<_> = removed.iter().filter_map(|tx| tx.goal_id).collect();
        for goal in goals {
            self.goal_progress.recompute_by_id(goal).await?;
        }
        let users: BTreeSet<UserId> = removed.iter().map(|tx| tx.user_id).collect();
        for user in users {
            self.budget_alerts.reconcile(user).await?;
        }

        let removed = removed.len() as u64;
        info!(%group, removed, "recurring series purged");
        Ok(removed)
    }
}
