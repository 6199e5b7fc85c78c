//! Listing models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Listing model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category: ListingCategory,
    pub image_url: String,
    pub view_count: i64,
    pub liked_by: Vec<Uuid>,
    pub status: ListingStatus,
    pub sold: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Whether the listing can still be edited or bought
    pub fn is_active(&self) -> bool {
        !self.sold && self.status == ListingStatus::Active
    }

    pub fn like_count(&self) -> i64 {
        self.liked_by.len() as i64
    }
}

/// Listing status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Sold,
    Deleted,
}

/// Listing category
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "listing_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingCategory {
    Fashion,
    Electronics,
    Books,
    Hobby,
    Home,
    Other,
}

/// Request DTO for creating a listing
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[validate(range(min = 1, max = 10000))]
    pub price: i64,
    pub category: ListingCategory,
    #[validate(url)]
    pub image_url: String,
}

/// Request DTO for updating a listing
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[validate(range(min = 1, max = 10000))]
    pub price: i64,
    pub category: ListingCategory,
    /// Image is only replaced when a new URL is supplied
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Sort keys for listing queries
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Popularity,
}

/// Query parameters for listing the listings
#[derive(Debug, Deserialize, Default)]
pub struct ListListingsQuery {
    pub status: Option<ListingStatus>,
    pub category: Option<ListingCategory>,
    pub seller_id: Option<Uuid>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: Option<SortKey>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

/// Response DTO for like toggling
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}
