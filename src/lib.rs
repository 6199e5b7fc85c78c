//! Tradepost Backend Library
//!
//! This library exports the core modules for the Tradepost marketplace
//! backend server.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod middleware;
pub mod notification;
pub mod order;
pub mod payment;
pub mod pricing;
pub mod routes;
pub mod state;
