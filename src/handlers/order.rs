//! Order ledger API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::order::{Earnings, ListOrdersQuery, Order, UpdateShippingRequest};
use crate::state::AppState;

/// List the authenticated user's orders by role
pub async fn list_orders(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = app_state
        .order_service
        .list_orders(user.user_id, query)
        .await?;

    Ok(Json(orders))
}

/// Get a single order (buyer or seller only)
pub async fn get_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Order>> {
    let order = app_state.order_service.get_order(&id, user.user_id).await?;
    Ok(Json(order))
}

/// Update shipping fields on a completed order (seller only)
pub async fn update_shipping(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateShippingRequest>,
) -> ApiResult<Json<Order>> {
    let order = app_state
        .order_service
        .update_shipping(&id, user.user_id, request)
        .await?;

    Ok(Json(order))
}

/// Refund a completed order (seller only)
pub async fn refund_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Order>> {
    let order = app_state
        .order_service
        .refund_order(&id, user.user_id)
        .await?;

    Ok(Json(order))
}

/// Aggregate earnings for the authenticated seller
pub async fn get_earnings(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Earnings>> {
    let earnings = app_state.order_service.earnings(user.user_id).await?;
    Ok(Json(earnings))
}
