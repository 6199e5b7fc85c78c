//! Listing-related API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::listing::{
    CreateListingRequest, LikeResponse, ListListingsQuery, Listing, UpdateListingRequest,
};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Create a new listing
pub async fn create_listing(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateListingRequest>,
) -> ApiResult<(StatusCode, Json<Listing>)> {
    let listing = app_state
        .listing_service
        .create_listing(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(listing)))
}

/// List listings with filtering, sorting and pagination
pub async fn list_listings(
    State(app_state): State<AppState>,
    Query(query): Query<ListListingsQuery>,
) -> ApiResult<Json<Vec<Listing>>> {
    let listings = app_state.listing_service.list_listings(query).await?;
    Ok(Json(listings))
}

/// Get a single listing; counts the view
pub async fn get_listing(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Listing>> {
    let listing = app_state
        .listing_service
        .view_listing(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Listing not found".to_string()))?;

    Ok(Json(listing))
}

/// Update a listing (owner only, active only)
pub async fn update_listing(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> ApiResult<Json<Listing>> {
    let listing = app_state
        .listing_service
        .update_listing(&id, user.user_id, request)
        .await?;

    Ok(Json(listing))
}

/// Soft-delete a listing (owner only)
pub async fn delete_listing(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    app_state
        .listing_service
        .delete_listing(&id, user.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Toggle a like on a listing
pub async fn toggle_like(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LikeResponse>> {
    let response = app_state
        .listing_service
        .toggle_like(&id, user.user_id)
        .await?;

    Ok(Json(response))
}
