//! Checkout session issuer
//!
//! Validates a purchase intent and opens a hosted checkout session with the
//! payment provider. Nothing is written locally here; the listing only
//! changes state when the completion webhook settles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::listing::Listing;
use crate::payment::{CreateSessionParams, PaymentProvider, SessionMetadata};
use crate::pricing;

/// Request DTO for opening a checkout session
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    pub listing_id: Uuid,
}

/// Response DTO carrying the provider redirect
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub redirect_url: String,
    pub session_id: String,
}

/// Checkout session issuer
pub struct CheckoutService {
    db_pool: PgPool,
    provider: Arc<PaymentProvider>,
    frontend_url: String,
}

impl CheckoutService {
    pub fn new(db_pool: PgPool, provider: Arc<PaymentProvider>, frontend_url: String) -> Self {
        Self {
            db_pool,
            provider,
            frontend_url,
        }
    }

    /// Open a checkout session for the given buyer and listing.
    ///
    /// Preconditions are checked in order, first failure wins: the listing
    /// must exist, the buyer must not be the seller, and the listing must
    /// still be active and unsold.
    pub async fn create_checkout(
        &self,
        buyer_id: Uuid,
        request: CreateCheckoutRequest,
    ) -> ApiResult<CheckoutResponse> {
        let listing =
            sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
                .bind(request.listing_id)
                .fetch_optional(&self.db_pool)
                .await?
                .ok_or_else(|| ApiError::NotFound("Listing not found".to_string()))?;

        if listing.seller_id == buyer_id {
            return Err(ApiError::InvalidOperation(
                "You cannot buy your own listing".to_string(),
            ));
        }
        if !listing.is_active() {
            return Err(ApiError::Conflict("Listing is already sold".to_string()));
        }

        let commission = pricing::commission(listing.price);
        let seller_amount = pricing::seller_amount(listing.price);

        // The metadata travels through the provider and back in the
        // completion event; settlement reads amounts from it verbatim, so a
        // price edit between now and settlement cannot change what was paid.
        let metadata = SessionMetadata {
            listing_id: listing.id,
            buyer_id,
            seller_id: listing.seller_id,
            amount: listing.price,
            commission,
            seller_amount,
        };

        let session = self
            .provider
            .create_checkout_session(CreateSessionParams {
                product_name: listing.name.clone(),
                amount: listing.price,
                success_url: format!(
                    "{}/success.html?listing_id={}",
                    self.frontend_url, listing.id
                ),
                cancel_url: format!("{}/cancel.html", self.frontend_url),
                metadata,
            })
            .await
            .map_err(|e| {
                tracing::error!(listing_id = %listing.id, error = %e, "Checkout session creation failed");
                ApiError::ServiceUnavailable("Payment provider is unavailable".to_string())
            })?;

        tracing::info!(
            listing_id = %listing.id,
            buyer_id = %buyer_id,
            session_id = %session.id,
            "Checkout session created"
        );

        Ok(CheckoutResponse {
            redirect_url: session.url,
            session_id: session.id,
        })
    }
}
