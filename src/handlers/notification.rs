//! Notification API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::notification::{CreateNotificationRequest, Notification, UnreadCount};
use crate::state::AppState;

/// List the authenticated user's notifications, newest first
pub async fn list_notifications(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = app_state
        .notification_service
        .list_for_recipient(user.user_id)
        .await?;

    Ok(Json(notifications))
}

/// Count unread notifications
pub async fn unread_count(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<UnreadCount>> {
    let count = app_state
        .notification_service
        .unread_count(user.user_id)
        .await?;

    Ok(Json(count))
}

/// Create a notification (e.g. a like or comment ping)
pub async fn create_notification(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateNotificationRequest>,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    let notification = app_state
        .notification_service
        .create_notification(
            request.recipient_id,
            Some(user.user_id),
            request.kind,
            request.listing_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(notification)))
}

/// Mark a notification read (recipient only)
pub async fn mark_read(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Notification>> {
    let notification = app_state
        .notification_service
        .mark_read(&id, user.user_id)
        .await?;

    Ok(Json(notification))
}
