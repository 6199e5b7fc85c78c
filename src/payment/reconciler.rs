//! Webhook reconciler
//!
//! Consumes signed payment-completion events and drives settlement: the
//! listing flips to sold and the order is recorded in one transaction. The
//! provider may deliver the same event twice, deliver late, or interleave
//! events for different listings; settlement stays correct under all of
//! those through the payment-id uniqueness constraint and the conditional
//! sold update, not through in-process locks.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::notification::{NotificationKind, NotificationService};
use crate::order::{Order, OrderStatus};
use crate::payment::{
    PaymentProvider, SessionMetadata, WebhookEvent, CHECKOUT_COMPLETED,
};

/// Result of processing one webhook delivery.
///
/// Every variant except a transport/database failure is acknowledged with
/// 200 so the provider stops redelivering.
#[derive(Debug)]
pub enum SettlementOutcome {
    /// First delivery: listing sold, order recorded
    Settled(Order),
    /// Transaction id already in the ledger; no writes performed
    Duplicate,
    /// Payment completed but the listing was already sold under a different
    /// transaction id; the order is recorded as flagged for manual refund
    Flagged(Order),
    /// Metadata referenced a listing that no longer exists
    ListingMissing,
    /// Event type, shape or metadata we do not act on
    Ignored,
}

/// Webhook reconciler service
pub struct WebhookReconciler {
    db_pool: PgPool,
    provider: Arc<PaymentProvider>,
    notifications: NotificationService,
}

impl WebhookReconciler {
    pub fn new(
        db_pool: PgPool,
        provider: Arc<PaymentProvider>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            db_pool,
            provider,
            notifications,
        }
    }

    /// Authenticate and process one raw webhook delivery.
    ///
    /// `payload` must be the exact bytes the provider sent; the signature is
    /// computed over them, so the transport layer hands them through without
    /// re-serialization.
    pub async fn process_webhook(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> ApiResult<SettlementOutcome> {
        let signature_header = signature_header.ok_or_else(|| {
            ApiError::BadRequest("Missing webhook signature header".to_string())
        })?;

        self.provider
            .verify_webhook_signature(payload, signature_header)
            .map_err(|e| {
                tracing::warn!(error = %e, "Webhook signature verification failed");
                ApiError::BadRequest("Webhook signature verification failed".to_string())
            })?;

        // Past the signature check, every delivery is acknowledged: 400s
        // here would only make the provider redeliver payloads we will
        // never act on.
        let event: WebhookEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Webhook payload did not parse as an event envelope");
                return Ok(SettlementOutcome::Ignored);
            }
        };

        if event.event_type != CHECKOUT_COMPLETED {
            tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
            return Ok(SettlementOutcome::Ignored);
        }

        let event_id = event.id.clone();
        let session = match event.into_checkout_session() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    event_id = %event_id,
                    error = %e,
                    "Completion event carried an unusable session object"
                );
                return Ok(SettlementOutcome::Ignored);
            }
        };
        let payment_id = session.transaction_id().to_string();

        let metadata = match SessionMetadata::from_map(&session.metadata) {
            Ok(metadata) => metadata,
            Err(e) => {
                // Cannot settle without the session metadata; ack so the
                // provider does not redeliver forever.
                tracing::warn!(
                    session_id = %session.id,
                    error = %e,
                    "Completion event carried unusable metadata"
                );
                return Ok(SettlementOutcome::Ignored);
            }
        };

        self.settle(&payment_id, &metadata).await
    }

    /// Settle one verified completion event.
    async fn settle(
        &self,
        payment_id: &str,
        metadata: &SessionMetadata,
    ) -> ApiResult<SettlementOutcome> {
        // Fast-path dedup; the unique constraint below remains the
        // authoritative check for deliveries racing each other.
        let already_recorded = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE payment_id = $1)",
        )
        .bind(payment_id)
        .fetch_one(&self.db_pool)
        .await?;

        if already_recorded {
            tracing::info!(payment_id = %payment_id, "Duplicate webhook delivery, skipping");
            return Ok(SettlementOutcome::Duplicate);
        }

        let listing_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM listings WHERE id = $1)",
        )
        .bind(metadata.listing_id)
        .fetch_one(&self.db_pool)
        .await?;

        if !listing_exists {
            tracing::warn!(
                listing_id = %metadata.listing_id,
                payment_id = %payment_id,
                "Completion event references a missing listing"
            );
            return Ok(SettlementOutcome::ListingMissing);
        }

        let mut tx = self.db_pool.begin().await?;

        // Only the first settlement for a listing wins; a second completion
        // under a different transaction id falls through to a flagged order.
        let settled_listing = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE listings
            SET sold = true, status = 'sold', buyer_id = $2, updated_at = $3
            WHERE id = $1 AND sold = false AND status = 'active'
            RETURNING id
            "#,
        )
        .bind(metadata.listing_id)
        .bind(metadata.buyer_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let status = if settled_listing.is_some() {
            OrderStatus::Completed
        } else {
            OrderStatus::Flagged
        };

        let insert_result = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, payment_id, listing_id, buyer_id, seller_id,
                amount, commission, seller_amount, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payment_id)
        .bind(metadata.listing_id)
        .bind(metadata.buyer_id)
        .bind(metadata.seller_id)
        .bind(metadata.amount)
        .bind(metadata.commission)
        .bind(metadata.seller_amount)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await;

        let order = match insert_result {
            Ok(order) => order,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // A concurrent delivery of the same transaction id won the
                // race; rolling back also undoes the sold update above.
                tx.rollback().await?;
                tracing::info!(payment_id = %payment_id, "Concurrent duplicate delivery, skipping");
                return Ok(SettlementOutcome::Duplicate);
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        if order.status == OrderStatus::Flagged {
            tracing::warn!(
                order_id = %order.id,
                listing_id = %metadata.listing_id,
                payment_id = %payment_id,
                "Listing already sold under another transaction; order flagged for manual refund"
            );
            return Ok(SettlementOutcome::Flagged(order));
        }

        tracing::info!(
            order_id = %order.id,
            listing_id = %metadata.listing_id,
            payment_id = %payment_id,
            amount = order.amount,
            "Settlement completed"
        );

        self.notify_parties(&order).await;

        Ok(SettlementOutcome::Settled(order))
    }

    /// Best-effort notification fan-out after settlement is durable.
    /// Failures are logged and swallowed; they never unwind the settlement.
    async fn notify_parties(&self, order: &Order) {
        if let Err(e) = self
            .notifications
            .create_notification(
                order.seller_id,
                Some(order.buyer_id),
                NotificationKind::Purchase,
                Some(order.listing_id),
            )
            .await
        {
            tracing::warn!(order_id = %order.id, error = %e, "Failed to notify seller");
        }

        if let Err(e) = self
            .notifications
            .create_notification(
                order.buyer_id,
                Some(order.seller_id),
                NotificationKind::Bought,
                Some(order.listing_id),
            )
            .await
        {
            tracing::warn!(order_id = %order.id, error = %e, "Failed to notify buyer");
        }
    }
}
