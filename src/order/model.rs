//! Order models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Order model - one row per settled payment-provider transaction
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Order {
    pub id: Uuid,
    /// External payment-provider transaction id; unique, the dedup key
    pub payment_id: String,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    /// Gross amount = commission + seller_amount
    pub amount: i64,
    pub commission: i64,
    pub seller_amount: i64,
    pub status: OrderStatus,
    pub shipping_address: Option<sqlx::types::Json<ShippingAddress>>,
    pub tracking_number: Option<String>,
    pub shipping_status: ShippingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order status
///
/// `Flagged` marks an order whose payment completed against a listing that
/// was already sold under a different transaction id; it needs a manual
/// refund and is never silently dropped.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
    Refunded,
    Flagged,
}

/// Shipping progress for a completed order
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "shipping_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShippingStatus {
    Preparing,
    Shipped,
    Delivered,
}

/// Shipping address sub-record, stored as JSON alongside the order
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShippingAddress {
    pub name: String,
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub address1: String,
    pub address2: Option<String>,
    pub phone: Option<String>,
}

/// Which side of the ledger a party query asks for
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderRole {
    Buying,
    Selling,
    #[default]
    All,
}

/// Query parameters for listing orders
#[derive(Debug, Deserialize, Default)]
pub struct ListOrdersQuery {
    pub role: Option<OrderRole>,
    pub status: Option<OrderStatus>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

/// Request DTO for shipping updates
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateShippingRequest {
    #[validate(length(min = 1, max = 64))]
    pub tracking_number: Option<String>,
    pub shipping_status: ShippingStatus,
}

/// Aggregate earnings for a seller over completed orders
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Earnings {
    pub total_sales: i64,
    pub total_commission: i64,
    pub total_earnings: i64,
    pub completed_orders: i64,
}
