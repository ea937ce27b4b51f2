//! planpay - payment-order lifecycle and credit-ledger service.
//!
//! planpay is the payment core of the placement portal: it creates
//! provider-side orders for credit-plan purchases, authenticates returning
//! payment confirmations against the provider's shared secret, credits each
//! confirmed payment to the account ledger exactly once, and answers the
//! plan/balance reads that gate every paid feature in the portal.
//!
//! # Architecture
//!
//! - [`payment`] - order issuance, HMAC verification, idempotent commit
//! - [`ledger`] - the in-memory account store and its atomic commit
//! - [`api`] - the axum HTTP surface (`/payments/*`)
//! - [`plan`] - plan catalog and the access-gate policy
//! - [`service`] - wiring and the server lifecycle

pub mod account;
pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod payment;
pub mod plan;
pub mod service;

pub use account::{Account, AccountId, PaymentRecord, PaymentState};
pub use config::{Secrets, ServiceConfig};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use plan::{can_apply, Plan, PlanCatalog, PlanCategory};
pub use service::{RunningService, ServiceBuilder};
