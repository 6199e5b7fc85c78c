//! Webhook event payloads from the payment provider

use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

/// Event type emitted when a hosted checkout finishes successfully
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Signed event envelope delivered to the webhook endpoint.
///
/// Only the routing fields are typed; the inner object stays a raw value so
/// event kinds we never act on parse regardless of their shape. The session
/// is decoded on demand once the type is known to be a completion.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Decode the checkout session carried in a completion event
    pub fn into_checkout_session(self) -> serde_json::Result<CheckoutSessionObject> {
        serde_json::from_value(self.data.object)
    }
}

/// The checkout session carried inside a completion event
#[derive(Debug, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub payment_intent: Option<String>,
    pub amount_total: Option<i64>,
    pub customer_email: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionObject {
    /// The transaction id used as the ledger dedup key.
    ///
    /// Falls back to the session id for providers that settle without a
    /// separate payment intent.
    pub fn transaction_id(&self) -> &str {
        self.payment_intent.as_deref().unwrap_or(&self.id)
    }
}

/// Metadata attached at session creation and read back verbatim at
/// settlement.
///
/// This is the sole channel between checkout and settlement: the amounts
/// committed here are what the order records, never a recomputation from the
/// listing (whose price may have been edited in between). Provider metadata
/// values are strings on the wire, hence the explicit map conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub amount: i64,
    pub commission: i64,
    pub seller_amount: i64,
}

impl SessionMetadata {
    /// Encode as provider metadata key/value pairs
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("listing_id".to_string(), self.listing_id.to_string()),
            ("buyer_id".to_string(), self.buyer_id.to_string()),
            ("seller_id".to_string(), self.seller_id.to_string()),
            ("amount".to_string(), self.amount.to_string()),
            ("commission".to_string(), self.commission.to_string()),
            ("seller_amount".to_string(), self.seller_amount.to_string()),
        ])
    }

    /// Decode from provider metadata; any missing or malformed field fails
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, MetadataError> {
        fn field<'a>(
            map: &'a HashMap<String, String>,
            key: &'static str,
        ) -> Result<&'a str, MetadataError> {
            map.get(key)
                .map(String::as_str)
                .ok_or(MetadataError::MissingField(key))
        }

        fn uuid_field(
            map: &HashMap<String, String>,
            key: &'static str,
        ) -> Result<Uuid, MetadataError> {
            field(map, key)?
                .parse()
                .map_err(|_| MetadataError::MalformedField(key))
        }

        fn int_field(
            map: &HashMap<String, String>,
            key: &'static str,
        ) -> Result<i64, MetadataError> {
            field(map, key)?
                .parse()
                .map_err(|_| MetadataError::MalformedField(key))
        }

        Ok(SessionMetadata {
            listing_id: uuid_field(map, "listing_id")?,
            buyer_id: uuid_field(map, "buyer_id")?,
            seller_id: uuid_field(map, "seller_id")?,
            amount: int_field(map, "amount")?,
            commission: int_field(map, "commission")?,
            seller_amount: int_field(map, "seller_amount")?,
        })
    }
}

/// Session metadata decode errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Missing metadata field: {0}")]
    MissingField(&'static str),

    #[error("Malformed metadata field: {0}")]
    MalformedField(&'static str),
}
