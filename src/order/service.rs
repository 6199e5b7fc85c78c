//! Order service layer - Queries and transitions on the purchase ledger
//!
//! Rows are only ever inserted by the webhook reconciler; this service covers
//! the read paths and the narrow set of allowed mutations (shipping fields,
//! completed -> refunded).

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::order::{Earnings, ListOrdersQuery, Order, OrderRole, UpdateShippingRequest};

#[derive(Clone)]
pub struct OrderService {
    db_pool: PgPool,
}

impl OrderService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Get a single order; only the buyer or seller may read it
    pub async fn get_order(&self, id: &Uuid, user_id: Uuid) -> ApiResult<Order> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

        if order.buyer_id != user_id && order.seller_id != user_id {
            return Err(ApiError::Forbidden(
                "Order belongs to another user".to_string(),
            ));
        }

        Ok(order)
    }

    /// List orders where the user is buyer, seller or either, newest first
    pub async fn list_orders(&self, user_id: Uuid, query: ListOrdersQuery) -> ApiResult<Vec<Order>> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM orders WHERE ");

        match query.role.unwrap_or_default() {
            OrderRole::Buying => {
                query_builder.push("buyer_id = ");
                query_builder.push_bind(user_id);
            }
            OrderRole::Selling => {
                query_builder.push("seller_id = ");
                query_builder.push_bind(user_id);
            }
            OrderRole::All => {
                query_builder.push("(buyer_id = ");
                query_builder.push_bind(user_id);
                query_builder.push(" OR seller_id = ");
                query_builder.push_bind(user_id);
                query_builder.push(")");
            }
        }

        if let Some(status) = query.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }

        query_builder.push(" ORDER BY created_at DESC LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset as i64);

        let orders = query_builder
            .build_query_as::<Order>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(orders)
    }

    /// Aggregate gross, commission and net totals over a seller's completed orders
    pub async fn earnings(&self, seller_id: Uuid) -> ApiResult<Earnings> {
        let earnings = sqlx::query_as::<_, Earnings>(
            r#"
            SELECT
                COALESCE(SUM(amount), 0)::BIGINT AS total_sales,
                COALESCE(SUM(commission), 0)::BIGINT AS total_commission,
                COALESCE(SUM(seller_amount), 0)::BIGINT AS total_earnings,
                COUNT(*)::BIGINT AS completed_orders
            FROM orders
            WHERE seller_id = $1 AND status = 'completed'
            "#,
        )
        .bind(seller_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(earnings)
    }

    /// Update shipping fields; only the seller, only on a completed order
    pub async fn update_shipping(
        &self,
        id: &Uuid,
        user_id: Uuid,
        request: UpdateShippingRequest,
    ) -> ApiResult<Order> {
        request.validate()?;

        let order = self.get_order(id, user_id).await?;

        if order.seller_id != user_id {
            return Err(ApiError::Forbidden(
                "Only the seller can update shipping".to_string(),
            ));
        }
        if order.status != crate::order::OrderStatus::Completed {
            return Err(ApiError::InvalidOperation(
                "Shipping can only be updated on completed orders".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET tracking_number = COALESCE($1, tracking_number),
                shipping_status = $2,
                updated_at = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(request.tracking_number.as_deref())
        .bind(request.shipping_status)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(updated)
    }

    /// Transition a completed order to refunded.
    ///
    /// The status guard lives in SQL so the transition cannot race another
    /// refund of the same order.
    pub async fn refund_order(&self, id: &Uuid, user_id: Uuid) -> ApiResult<Order> {
        let order = self.get_order(id, user_id).await?;

        if order.seller_id != user_id {
            return Err(ApiError::Forbidden(
                "Only the seller can refund an order".to_string(),
            ));
        }

        let refunded = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'refunded', updated_at = $1
            WHERE id = $2 AND status = 'completed'
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| {
            ApiError::InvalidOperation("Only completed orders can be refunded".to_string())
        })?;

        tracing::info!(order_id = %id, "Order refunded");

        Ok(refunded)
    }
}
