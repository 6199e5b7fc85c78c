//! Notification fan-out module

mod model;
mod service;

pub use model::*;
pub use service::NotificationService;
