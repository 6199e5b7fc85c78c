//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::listing::ListingService;
use crate::middleware::AuthConfig;
use crate::notification::NotificationService;
use crate::order::OrderService;
use crate::payment::{CheckoutService, WebhookReconciler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub listing_service: Arc<ListingService>,
    pub order_service: Arc<OrderService>,
    pub notification_service: Arc<NotificationService>,
    pub checkout_service: Arc<CheckoutService>,
    pub reconciler: Arc<WebhookReconciler>,
    pub auth_config: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(
        listing_service: Arc<ListingService>,
        order_service: Arc<OrderService>,
        notification_service: Arc<NotificationService>,
        checkout_service: Arc<CheckoutService>,
        reconciler: Arc<WebhookReconciler>,
        auth_config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            listing_service,
            order_service,
            notification_service,
            checkout_service,
            reconciler,
            auth_config,
        }
    }
}

impl FromRef<AppState> for Arc<ListingService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.listing_service.clone()
    }
}

impl FromRef<AppState> for Arc<OrderService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.order_service.clone()
    }
}

impl FromRef<AppState> for Arc<NotificationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notification_service.clone()
    }
}

impl FromRef<AppState> for Arc<CheckoutService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.checkout_service.clone()
    }
}

impl FromRef<AppState> for Arc<WebhookReconciler> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.reconciler.clone()
    }
}

impl FromRef<AppState> for Arc<AuthConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_config.clone()
    }
}
