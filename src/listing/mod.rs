//! Listing domain module
//!
//! Contains models and service for the listing store.

mod model;
mod service;

pub use model::*;
pub use service::ListingService;
