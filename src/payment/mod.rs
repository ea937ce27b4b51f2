//! Payment-order lifecycle for planpay.
//!
//! This module implements the purchase flow end to end:
//! 1. Create a provider-side order and record the purchase intent server-side
//! 2. Authenticate the returning payment confirmation against the shared secret
//! 3. Commit the credit/plan mutation exactly once per payment handle
//!
//! # Architecture
//!
//! ```text
//! purchase request                    payment confirmation
//!        │                                     │
//!        ▼                                     ▼
//! ┌──────────────────┐              ┌─────────────────────┐
//! │ Validate against │              │ Recompute HMAC over │
//! │ plan catalog     │              │ orderId|paymentId   │
//! └────────┬─────────┘              └──────────┬──────────┘
//!          │                                   │
//!          ▼                            ┌──────┴──────┐
//! ┌──────────────────┐                  │             │
//! │ Provider order   │               MATCH        MISMATCH
//! │ (no ledger write)│                  │             │
//! └────────┬─────────┘                  ▼             ▼
//!          │                    Look up intent    Hard reject,
//!          ▼                    by orderId        no ledger effect
//! Record purchase intent               │
//! keyed by orderId                     ▼
//!                              Atomic, idempotent commit:
//!                              balance += credits
//!                              tier = purchased
//!                              history += success record
//! ```

mod cache;
mod order;
mod provider;
pub mod signature;
mod verifier;

pub use cache::{CacheStats, ProcessedCache};
pub use order::{CreatedOrder, OrderIssuer, PendingOrders, PurchaseIntent, PurchaseParams};
pub use provider::{
    HttpProvider, OrderNotes, OrderRequest, PaymentProvider, ProviderConfig, ProviderOrder,
    StubProvider,
};
pub use verifier::{PaymentVerifier, VerifiedPayment};
