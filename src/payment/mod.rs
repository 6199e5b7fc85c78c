//! Payment domain module
//!
//! Contains the payment-provider client, webhook event types, the checkout
//! session issuer and the webhook reconciler.

mod checkout;
mod event;
mod provider;
mod reconciler;

pub use checkout::{CheckoutResponse, CheckoutService, CreateCheckoutRequest};
pub use event::{
    CheckoutSessionObject, EventData, MetadataError, SessionMetadata, WebhookEvent,
    CHECKOUT_COMPLETED,
};
pub use provider::{
    CheckoutSession, CreateSessionParams, PaymentProvider, ProviderError, SignatureError,
};
pub use reconciler::{SettlementOutcome, WebhookReconciler};
