//! Listing route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/listings", post(create_listing))
        .route("/api/listings", get(list_listings))
        .route("/api/listings/:id", get(get_listing))
        .route("/api/listings/:id", put(update_listing))
        .route("/api/listings/:id", axum::routing::delete(delete_listing))
        .route("/api/listings/:id/like", post(toggle_like))
}
