//! API handlers for the Tradepost backend

mod checkout;
mod listing;
mod notification;
mod order;
mod webhook;

pub use checkout::*;
pub use listing::*;
pub use notification::*;
pub use order::*;
pub use webhook::*;
