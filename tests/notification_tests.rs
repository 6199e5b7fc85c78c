//! Notification tests: the recipient guard on the read flag.

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use tradepost_server::error::ApiError;
    use tradepost_server::notification::{NotificationKind, NotificationService};

    fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/tradepost_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&database_url)
            .expect("Failed to build test database pool")
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_only_the_recipient_can_mark_read() {
        let service = NotificationService::new(setup_test_db());

        let recipient_id = Uuid::new_v4();
        let notification = service
            .create_notification(recipient_id, None, NotificationKind::Like, None)
            .await
            .unwrap();

        let result = service.mark_read(&notification.id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));

        // The recipient flips the flag and the unread count drops
        let before = service.unread_count(recipient_id).await.unwrap();
        assert_eq!(before.unread, 1);

        let updated = service
            .mark_read(&notification.id, recipient_id)
            .await
            .unwrap();
        assert!(updated.read);

        let after = service.unread_count(recipient_id).await.unwrap();
        assert_eq!(after.unread, 0);
    }
}
