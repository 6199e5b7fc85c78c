//! Payment provider client
//!
//! Talks to a Stripe-style hosted-checkout API: session creation over REST
//! and HMAC verification of signed webhook deliveries. Signature checks run
//! over the exact raw request bytes; re-serializing the body breaks them.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::payment::SessionMetadata;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook before it is rejected as a replay
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Provider API errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Payment provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Payment provider returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Webhook signature verification errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Malformed signature header")]
    MalformedHeader,

    #[error("Signature timestamp outside tolerance")]
    StaleTimestamp,

    #[error("Signature mismatch")]
    Mismatch,
}

/// Parameters for creating a hosted checkout session
#[derive(Debug)]
pub struct CreateSessionParams {
    pub product_name: String,
    pub amount: i64,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: SessionMetadata,
}

/// A created checkout session
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetails {
    message: String,
}

/// Client for the hosted payment provider
pub struct PaymentProvider {
    http: reqwest::Client,
    api_url: String,
    secret_key: String,
    webhook_secret: String,
}

impl PaymentProvider {
    pub fn new(api_url: String, secret_key: String, webhook_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            secret_key,
            webhook_secret,
        }
    }

    /// Create a hosted checkout session carrying reconciliation metadata
    pub async fn create_checkout_session(
        &self,
        params: CreateSessionParams,
    ) -> Result<CheckoutSession, ProviderError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            (
                "line_items[0][price_data][currency]".to_string(),
                "jpy".to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                params.product_name,
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                params.amount.to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), params.success_url),
            ("cancel_url".to_string(), params.cancel_url),
        ];
        for (key, value) in params.metadata.to_map() {
            form.push((format!("metadata[{}]", key), value));
        }

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => "unreadable error body".to_string(),
            };
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session = response.json::<CheckoutSession>().await?;
        Ok(session)
    }

    /// Verify a webhook signature header against the raw payload bytes.
    ///
    /// Header format: `t=<unix-ts>,v1=<hex hmac-sha256 of "{t}.{payload}">`.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<(), SignatureError> {
        self.verify_webhook_signature_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    fn verify_webhook_signature_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<(), SignatureError> {
        let mut timestamp: Option<i64> = None;
        let mut signature: Option<Vec<u8>> = None;

        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = Some(value.parse().map_err(|_| SignatureError::MalformedHeader)?);
                }
                Some(("v1", value)) => {
                    signature =
                        Some(hex::decode(value).map_err(|_| SignatureError::MalformedHeader)?);
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
        let signature = signature.ok_or(SignatureError::MalformedHeader)?;

        if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(SignatureError::StaleTimestamp);
        }

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        // verify_slice is constant-time
        mac.verify_slice(&signature)
            .map_err(|_| SignatureError::Mismatch)
    }
}
