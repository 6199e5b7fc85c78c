//! Route definitions for the Tradepost API

mod checkout;
mod listing;
mod notification;
mod order;

pub use checkout::checkout_routes;
pub use listing::listing_routes;
pub use notification::notification_routes;
pub use order::order_routes;
