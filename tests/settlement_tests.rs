//! Settlement tests for the webhook reconciler

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use sqlx::PgPool;
    use uuid::Uuid;

    use tradepost_server::error::ApiError;
    use tradepost_server::notification::NotificationService;
    use tradepost_server::payment::{PaymentProvider, SettlementOutcome, WebhookReconciler};

    const WEBHOOK_SECRET: &str = "whsec_test123secret456";

    /// Helper to create a test database pool.
    ///
    /// connect_lazy defers the connection, so tests that never reach the
    /// database (signature failures) run without one.
    fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/tradepost_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&database_url)
            .expect("Failed to build test database pool")
    }

    fn setup_reconciler(db_pool: PgPool) -> WebhookReconciler {
        let provider = Arc::new(PaymentProvider::new(
            "https://api.payment.test".to_string(),
            "sk_test_xxx".to_string(),
            WEBHOOK_SECRET.to_string(),
        ));
        let notifications = NotificationService::new(db_pool.clone());
        WebhookReconciler::new(db_pool, provider, notifications)
    }

    fn sign(payload: &[u8], secret: &str) -> String {
        let timestamp = chrono::Utc::now().timestamp();
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.", timestamp).as_bytes());
        mac.update(payload);
        format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        )
    }

    fn completion_event(
        payment_id: &str,
        listing_id: Uuid,
        buyer_id: Uuid,
        seller_id: Uuid,
    ) -> Vec<u8> {
        serde_json::json!({
            "id": format!("evt_{}", payment_id),
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": format!("cs_{}", payment_id),
                    "payment_intent": payment_id,
                    "amount_total": 6000,
                    "customer_email": "buyer@example.com",
                    "metadata": {
                        "listing_id": listing_id.to_string(),
                        "buyer_id": buyer_id.to_string(),
                        "seller_id": seller_id.to_string(),
                        "amount": "6000",
                        "commission": "600",
                        "seller_amount": "5400"
                    }
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    async fn insert_listing(pool: &PgPool, seller_id: Uuid, price: i64) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO listings (id, seller_id, name, description, price, category, image_url)
            VALUES ($1, $2, 'Vintage camera', 'shutter works', $3, 'hobby', 'https://img.example.com/c.jpg')
            "#,
        )
        .bind(id)
        .bind(seller_id)
        .bind(price)
        .execute(pool)
        .await
        .expect("Failed to insert test listing");
        id
    }

    #[tokio::test]
    async fn test_invalid_signature_rejected_without_writes() {
        let reconciler = setup_reconciler(setup_test_db());
        let payload = completion_event("tx_sig", Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        // Signed with the wrong secret
        let header = sign(&payload, "wrong_secret");
        let result = reconciler.process_webhook(&payload, Some(&header)).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_missing_signature_rejected() {
        let reconciler = setup_reconciler(setup_test_db());
        let payload = completion_event("tx_sig2", Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let result = reconciler.process_webhook(&payload, None).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_settlement_sells_listing_and_records_order() {
        let pool = setup_test_db();
        let reconciler = setup_reconciler(pool.clone());

        let seller_id = Uuid::new_v4();
        let buyer_id = Uuid::new_v4();
        let listing_id = insert_listing(&pool, seller_id, 6000).await;

        let payment_id = format!("tx_{}", Uuid::new_v4());
        let payload = completion_event(&payment_id, listing_id, buyer_id, seller_id);
        let header = sign(&payload, WEBHOOK_SECRET);

        let outcome = reconciler
            .process_webhook(&payload, Some(&header))
            .await
            .expect("settlement should succeed");

        let order = match outcome {
            SettlementOutcome::Settled(order) => order,
            other => panic!("expected Settled, got {:?}", other),
        };

        assert_eq!(order.amount, 6000);
        assert_eq!(order.commission, 600);
        assert_eq!(order.seller_amount, 5400);
        assert_eq!(order.buyer_id, buyer_id);
        assert_eq!(order.seller_id, seller_id);

        let (sold, status): (bool, String) = sqlx::query_as(
            "SELECT sold, status::text FROM listings WHERE id = $1",
        )
        .bind(listing_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(sold);
        assert_eq!(status, "sold");

        // Both parties notified
        let notified: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE listing_id = $1",
        )
        .bind(listing_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(notified, 2);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_duplicate_delivery_is_a_noop() {
        let pool = setup_test_db();
        let reconciler = setup_reconciler(pool.clone());

        let seller_id = Uuid::new_v4();
        let buyer_id = Uuid::new_v4();
        let listing_id = insert_listing(&pool, seller_id, 6000).await;

        let payment_id = format!("tx_{}", Uuid::new_v4());
        let payload = completion_event(&payment_id, listing_id, buyer_id, seller_id);
        let header = sign(&payload, WEBHOOK_SECRET);

        let first = reconciler
            .process_webhook(&payload, Some(&header))
            .await
            .unwrap();
        assert!(matches!(first, SettlementOutcome::Settled(_)));

        // Redelivery of the identical event
        let second = reconciler
            .process_webhook(&payload, Some(&header))
            .await
            .unwrap();
        assert!(matches!(second, SettlementOutcome::Duplicate));

        let orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE payment_id = $1",
        )
        .bind(&payment_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(orders, 1);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_second_transaction_for_same_listing_is_flagged() {
        let pool = setup_test_db();
        let reconciler = setup_reconciler(pool.clone());

        let seller_id = Uuid::new_v4();
        let listing_id = insert_listing(&pool, seller_id, 6000).await;

        let first_payload = completion_event(
            &format!("tx_{}", Uuid::new_v4()),
            listing_id,
            Uuid::new_v4(),
            seller_id,
        );
        let outcome = reconciler
            .process_webhook(&first_payload, Some(&sign(&first_payload, WEBHOOK_SECRET)))
            .await
            .unwrap();
        assert!(matches!(outcome, SettlementOutcome::Settled(_)));

        // Different transaction id, same listing: the guard makes the first
        // settlement win and the second order is kept for manual refund.
        let second_payload = completion_event(
            &format!("tx_{}", Uuid::new_v4()),
            listing_id,
            Uuid::new_v4(),
            seller_id,
        );
        let outcome = reconciler
            .process_webhook(&second_payload, Some(&sign(&second_payload, WEBHOOK_SECRET)))
            .await
            .unwrap();

        let order = match outcome {
            SettlementOutcome::Flagged(order) => order,
            other => panic!("expected Flagged, got {:?}", other),
        };
        assert_eq!(
            serde_json::to_string(&order.status).unwrap(),
            r#""flagged""#
        );
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_unknown_listing_is_acknowledged() {
        let pool = setup_test_db();
        let reconciler = setup_reconciler(pool.clone());

        let payload = completion_event(
            &format!("tx_{}", Uuid::new_v4()),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let outcome = reconciler
            .process_webhook(&payload, Some(&sign(&payload, WEBHOOK_SECRET)))
            .await
            .unwrap();

        assert!(matches!(outcome, SettlementOutcome::ListingMissing));
    }

    #[tokio::test]
    async fn test_signed_foreign_object_shape_acknowledged() {
        let reconciler = setup_reconciler(setup_test_db());

        // Valid signature, but the inner object is not a checkout session
        let payload = serde_json::json!({
            "type": "invoice.paid",
            "data": { "object": { "amount_due": 100 } }
        })
        .to_string()
        .into_bytes();

        let outcome = reconciler
            .process_webhook(&payload, Some(&sign(&payload, WEBHOOK_SECRET)))
            .await
            .unwrap();

        assert!(matches!(outcome, SettlementOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_signed_completion_with_foreign_object_acknowledged() {
        let reconciler = setup_reconciler(setup_test_db());

        // Completion type but an object shape we cannot settle from
        let payload = serde_json::json!({
            "id": "evt_shape",
            "type": "checkout.session.completed",
            "data": { "object": { "amount_due": 100 } }
        })
        .to_string()
        .into_bytes();

        let outcome = reconciler
            .process_webhook(&payload, Some(&sign(&payload, WEBHOOK_SECRET)))
            .await
            .unwrap();

        assert!(matches!(outcome, SettlementOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_signed_unparseable_payload_acknowledged() {
        let reconciler = setup_reconciler(setup_test_db());

        let payload = b"not an event envelope".to_vec();
        let outcome = reconciler
            .process_webhook(&payload, Some(&sign(&payload, WEBHOOK_SECRET)))
            .await
            .unwrap();

        assert!(matches!(outcome, SettlementOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_unrelated_event_type_ignored() {
        let reconciler = setup_reconciler(setup_test_db());

        let payload = serde_json::json!({
            "id": "evt_other",
            "type": "payment_intent.created",
            "data": { "object": { "id": "pi_1" } }
        })
        .to_string()
        .into_bytes();

        let outcome = reconciler
            .process_webhook(&payload, Some(&sign(&payload, WEBHOOK_SECRET)))
            .await
            .unwrap();

        assert!(matches!(outcome, SettlementOutcome::Ignored));
    }
}
