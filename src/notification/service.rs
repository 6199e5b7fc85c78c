//! Notification service layer

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::notification::{Notification, NotificationKind, UnreadCount};

#[derive(Clone)]
pub struct NotificationService {
    db_pool: PgPool,
}

impl NotificationService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a notification
    pub async fn create_notification(
        &self,
        recipient_id: Uuid,
        sender_id: Option<Uuid>,
        kind: NotificationKind,
        listing_id: Option<Uuid>,
    ) -> ApiResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, recipient_id, sender_id, kind, listing_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipient_id)
        .bind(sender_id)
        .bind(kind)
        .bind(listing_id)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        Ok(notification)
    }

    /// List notifications for a recipient, newest first
    pub async fn list_for_recipient(&self, recipient_id: Uuid) -> ApiResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 ORDER BY created_at DESC",
        )
        .bind(recipient_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(notifications)
    }

    /// Count unread notifications for a recipient
    pub async fn unread_count(&self, recipient_id: Uuid) -> ApiResult<UnreadCount> {
        let unread = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND read = false",
        )
        .bind(recipient_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(UnreadCount { unread })
    }

    /// Mark a notification read; only the recipient may flip the flag
    pub async fn mark_read(&self, id: &Uuid, user_id: Uuid) -> ApiResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

        if notification.recipient_id != user_id {
            return Err(ApiError::Forbidden(
                "Notification belongs to another user".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = true WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(updated)
    }
}
