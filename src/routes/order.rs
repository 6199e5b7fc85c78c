//! Order route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/:id/shipping", put(update_shipping))
        .route("/api/orders/:id/refund", post(refund_order))
        .route("/api/earnings", get(get_earnings))
}
