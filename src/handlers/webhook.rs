//! Payment webhook handler
//!
//! The body is taken as raw bytes so signature verification runs over the
//! exact payload the provider signed. Every authenticated delivery is
//! acknowledged with 200, including business no-ops, to stop provider
//! redelivery; only signature failures get a 400.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the provider's webhook signature
pub const SIGNATURE_HEADER: &str = "payment-signature";

/// Receive a signed payment event
pub async fn payment_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok());

    app_state.reconciler.process_webhook(&body, signature).await?;

    Ok((StatusCode::OK, Json(json!({ "received": true }))))
}
