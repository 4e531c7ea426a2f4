//! Notification kinds and the delivery sink trait.
//!
//! Engines never talk to a delivery channel directly; they hand a
//! (user, kind, message, link) tuple to a [`NotificationSink`]. The sink owns
//! persistence, broadcast to live sessions, and duplicate suppression.

use async_trait::async_trait;
use fintra_shared::AppResult;
use fintra_shared::types::UserId;
use serde::{Deserialize, Serialize};

/// Kind of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A budget usage threshold was crossed upward.
    BudgetAlert,
    /// A savings goal reached its target amount.
    GoalCompleted,
    /// A savings goal passed its target date unmet.
    GoalFailed,
}

impl NotificationKind {
    /// Stable string form used for storage and dedup comparison.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BudgetAlert => "budget_alert",
            Self::GoalCompleted => "goal_completed",
            Self::GoalFailed => "goal_failed",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for engine-emitted notifications.
///
/// Implementations must treat an identical (user, kind, message) tuple as
/// already sent and skip re-creation. The engines' level-gating is the primary
/// duplicate guard; this is the defensive second layer against concurrent
/// triggers.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Records and delivers one notification.
    async fn notify(
        &self,
        user: UserId,
        kind: NotificationKind,
        message: &str,
        link: Option<&str>,
    ) -> AppResult<()>;
}
