//! Notification repository and live broadcast.

use async_trait::async_trait;
use fintra_core::notification::{NotificationKind, NotificationSink};
use fintra_shared::AppResult;
use fintra_shared::types::{NotificationId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use super::db_err;
use crate::entities::notifications;
use crate::entities::sea_orm_active_enums::NotificationKind as DbNotificationKind;

/// A stored notification, as broadcast to live subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    /// Notification ID.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// What happened.
    pub kind: NotificationKind,
    /// Human-readable message.
    pub message: String,
    /// Optional in-app link target.
    pub link: Option<String>,
}

/// `NotificationSink` implementation: persists each notification and fans it
/// out to live subscribers.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
    events: broadcast::Sender<NotificationEvent>,
}

impl NotificationRepository {
    /// Creates a new notification repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let (events, _) = broadcast::channel(256);
        Self { db, events }
    }

    /// Subscribes to notifications created from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl NotificationSink for NotificationRepository {
    async fn notify(
        &self,
        user: UserId,
        kind: NotificationKind,
        message: &str,
        link: Option<&str>,
    ) -> AppResult<()> {
        // Second defensive layer behind the engines' level gating: an
        // identical tuple is treated as already sent. This lookup is the
        // fast path; the unique index below is the authority under races.
        let duplicate = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user.into_inner()))
            .filter(notifications::Column::Kind.eq(DbNotificationKind::from(kind)))
            .filter(notifications::Column::Message.eq(message))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if duplicate.is_some() {
            debug!(%user, %kind, "duplicate notification suppressed");
            return Ok(());
        }

        let id = NotificationId::new();
        let inserted = notifications::ActiveModel {
            id: Set(id.into_inner()),
            user_id: Set(user.into_inner()),
            kind: Set(kind.into()),
            message: Set(message.to_string()),
            link: Set(link.map(str::to_string)),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await;
        match inserted {
            Ok(_) => {}
            // Raced with an identical tuple; the unique index on
            // (user_id, kind, message) makes the suppression atomic.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(%user, %kind, "duplicate notification suppressed");
                return Ok(());
            }
            Err(e) => return Err(db_err(e)),
        }

        // Live delivery is best-effort; with no subscribers `send` fails and
        // that is fine, the row is the durable record.
        let _ = self.events.send(NotificationEvent {
            id,
            user_id: user,
            kind,
            message: message.to_string(),
            link: link.map(str::to_string),
        });
        Ok(())
    }
}
