//! Notification models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Notification model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub listing_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification kinds
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Comment,
    /// Sent to the seller when their listing is bought
    Purchase,
    /// Sent to the buyer when their payment settles
    Bought,
    Like,
    Want,
}

/// Request DTO for creating a notification
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub listing_id: Option<Uuid>,
}

/// Unread count response
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}
