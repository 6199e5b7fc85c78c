//! Order ledger module
//!
//! Contains models and service for the append-mostly purchase ledger.

mod model;
mod service;

pub use model::*;
pub use service::OrderService;
