//! Order ledger tests: the earnings aggregate over completed orders.

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use tradepost_server::order::OrderService;

    fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/tradepost_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&database_url)
            .expect("Failed to build test database pool")
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

    async fn insert_order(
        pool: &PgPool,
        seller_id: Uuid,
        amount: i64,
        commission: i64,
        status: &str,
    ) {
        let listing_id = insert_listing(pool, seller_id, amount).await;
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, payment_id, listing_id, buyer_id, seller_id,
                amount, commission, seller_amount, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::order_status)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(format!("tx_{}", Uuid::new_v4()))
        .bind(listing_id)
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(amount)
        .bind(commission)
        .bind(amount - commission)
        .bind(status)
        .execute(pool)
        .await
        .expect("Failed to insert test order");
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_earnings_sum_completed_orders_only() {
        let pool = setup_test_db();
        let service = OrderService::new(pool.clone());

        let seller_id = Uuid::new_v4();
        // Above the tier threshold: 10% commission
        insert_order(&pool, seller_id, 6000, 600, "completed").await;
        // Below the threshold: 5% commission
        insert_order(&pool, seller_id, 2000, 100, "completed").await;
        // Refunded and flagged orders never count towards earnings
        insert_order(&pool, seller_id, 4000, 200, "refunded").await;
        insert_order(&pool, seller_id, 3000, 150, "flagged").await;

        let earnings = service.earnings(seller_id).await.unwrap();

        assert_eq!(earnings.total_sales, 8000);
        assert_eq!(earnings.total_commission, 700);
        assert_eq!(earnings.total_earnings, 7300);
        assert_eq!(earnings.completed_orders, 2);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_earnings_zero_for_seller_without_sales() {
        let service = OrderService::new(setup_test_db());

        let earnings = service.earnings(Uuid::new_v4()).await.unwrap();

        assert_eq!(earnings.total_sales, 0);
        assert_eq!(earnings.total_earnings, 0);
        assert_eq!(earnings.completed_orders, 0);
    }
}
