//! HTTP surface of the payment core.
//!
//! # Security
//!
//! Every route requires a valid session token in the
//! `Authorization: Bearer <token>` header. The token is validated with the
//! [`TokenVerifier`] injected as an axum extension; the subject it
//! carries is the only account a request can act on.

mod auth;
mod error;
mod handlers;
mod types;

pub use auth::{AuthAccount, TokenVerifier};
pub use error::ApiError;
pub use types::{
    CurrentPlanResponse, HistoryResponse, PaymentRecordDto, PurchaseRequest, PurchaseResponse,
    VerifyRequest, VerifyResponse,
};

use crate::payment::PaymentProvider;
use crate::service::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Creates the payment [`Router`].
pub fn create_router<P: PaymentProvider + 'static>(
    state: Arc<AppState<P>>,
    tokens: Arc<TokenVerifier>,
) -> Router {
    Router::new()
        .route("/payments/purchase", post(handlers::purchase_plan))
        .route("/payments/verify", post(handlers::verify_payment))
        .route("/payments/current-plan", get(handlers::current_plan))
        .route("/payments/history", get(handlers::payment_history))
        .layer(Extension(tokens))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
