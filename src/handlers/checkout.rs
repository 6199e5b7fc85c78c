//! Checkout session API handler

use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::payment::{CheckoutResponse, CreateCheckoutRequest};
use crate::state::AppState;

/// Open a hosted checkout session for a listing
pub async fn create_checkout(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateCheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let response = app_state
        .checkout_service
        .create_checkout(user.user_id, request)
        .await?;

    Ok(Json(response))
}
