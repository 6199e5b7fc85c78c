//! Middleware for the Tradepost API
//!
//! This module provides middleware for request tracing and authentication.

pub mod auth;
mod tracing;

pub use auth::{AuthConfig, AuthenticatedUser};
pub use tracing::request_tracing;
