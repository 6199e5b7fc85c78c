//! Listing service layer - Business logic for the listing store

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::listing::{
    CreateListingRequest, LikeResponse, ListListingsQuery, Listing, ListingStatus, SortKey,
    UpdateListingRequest,
};

/// Listing service for managing the listing lifecycle
#[derive(Clone)]
pub struct ListingService {
    db_pool: PgPool,
}

impl ListingService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a new listing owned by the given seller
    pub async fn create_listing(
        &self,
        seller_id: Uuid,
        request: CreateListingRequest,
    ) -> ApiResult<Listing> {
        request.validate()?;

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (
                id, seller_id, name, description, price, category, image_url,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seller_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.category)
        .bind(&request.image_url)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(listing_id = %listing.id, seller_id = %seller_id, "Listing created");

        Ok(listing)
    }

    /// Get a single listing by ID
    pub async fn get_listing(&self, id: &Uuid) -> ApiResult<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(listing)
    }

    /// Get a listing and count the view
    pub async fn view_listing(&self, id: &Uuid) -> ApiResult<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET view_count = view_count + 1
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(listing)
    }

    /// List listings with filtering, sorting and pagination
    pub async fn list_listings(&self, query: ListListingsQuery) -> ApiResult<Vec<Listing>> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM listings WHERE 1=1");

        if let Some(status) = query.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        } else {
            // Soft-deleted listings never show up in public queries
            query_builder.push(" AND status != ");
            query_builder.push_bind(ListingStatus::Deleted);
        }
        if let Some(category) = query.category {
            query_builder.push(" AND category = ");
            query_builder.push_bind(category);
        }
        if let Some(seller_id) = query.seller_id {
            query_builder.push(" AND seller_id = ");
            query_builder.push_bind(seller_id);
        }
        if let Some(min_price) = query.min_price {
            query_builder.push(" AND price >= ");
            query_builder.push_bind(min_price);
        }
        if let Some(max_price) = query.max_price {
            query_builder.push(" AND price <= ");
            query_builder.push_bind(max_price);
        }

        match query.sort.unwrap_or_default() {
            SortKey::Newest => query_builder.push(" ORDER BY created_at DESC"),
            SortKey::PriceAsc => query_builder.push(" ORDER BY price ASC, created_at DESC"),
            SortKey::PriceDesc => query_builder.push(" ORDER BY price DESC, created_at DESC"),
            SortKey::Popularity => query_builder.push(" ORDER BY view_count DESC, created_at DESC"),
        };

        query_builder.push(" LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset as i64);

        let listings = query_builder
            .build_query_as::<Listing>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(listings)
    }

    /// Update a listing; only the owner may edit, and only while active
    pub async fn update_listing(
        &self,
        id: &Uuid,
        user_id: Uuid,
        request: UpdateListingRequest,
    ) -> ApiResult<Listing> {
        request.validate()?;

        let listing = self
            .get_listing(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Listing not found".to_string()))?;

        if listing.seller_id != user_id {
            return Err(ApiError::Forbidden(
                "Only the seller can edit this listing".to_string(),
            ));
        }
        if !listing.is_active() {
            return Err(ApiError::InvalidOperation(
                "Sold or deleted listings cannot be edited".to_string(),
            ));
        }

        // The status guard is repeated in SQL so a concurrent settlement
        // cannot slip an edit onto a just-sold listing.
        let updated = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET name = $1, description = $2, price = $3, category = $4,
                image_url = COALESCE($5, image_url), updated_at = $6
            WHERE id = $7 AND sold = false AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.category)
        .bind(request.image_url.as_deref())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("Listing was sold while the edit was in flight".to_string())
        })?;

        Ok(updated)
    }

    /// Soft-delete a listing; only the owner may delete, and only while active
    pub async fn delete_listing(&self, id: &Uuid, user_id: Uuid) -> ApiResult<()> {
        let listing = self
            .get_listing(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Listing not found".to_string()))?;

        if listing.seller_id != user_id {
            return Err(ApiError::Forbidden(
                "Only the seller can delete this listing".to_string(),
            ));
        }
        if !listing.is_active() {
            return Err(ApiError::InvalidOperation(
                "Sold or deleted listings cannot be deleted".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE listings
            SET status = 'deleted', updated_at = $1
            WHERE id = $2 AND sold = false AND status = 'active'
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        tracing::info!(listing_id = %id, "Listing soft-deleted");

        Ok(())
    }

    /// Toggle a like for the given user: add if absent, remove if present.
    ///
    /// The toggle happens in a single UPDATE so two rapid taps cannot
    /// double-add the same user.
    pub async fn toggle_like(&self, id: &Uuid, user_id: Uuid) -> ApiResult<LikeResponse> {
        let liked_by = sqlx::query_scalar::<_, Vec<Uuid>>(
            r#"
            UPDATE listings
            SET liked_by = CASE
                    WHEN $2 = ANY(liked_by) THEN array_remove(liked_by, $2)
                    ELSE array_append(liked_by, $2)
                END,
                updated_at = $3
            WHERE id = $1
            RETURNING liked_by
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Listing not found".to_string()))?;

        Ok(LikeResponse {
            liked: liked_by.contains(&user_id),
            like_count: liked_by.len() as i64,
        })
    }
}
