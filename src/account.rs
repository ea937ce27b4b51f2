//! Account and payment-record types.
//!
//! An account owns its plan/credit state: the current tier, the consumable
//! credit balance, and an append-only payment history. These fields are the
//! single source of truth for every access-gating decision in the portal.

use crate::plan::PlanCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque account identifier issued by the identity provider.
pub type AccountId = String;

/// Settlement state of a payment record.
///
/// The verified commit path only ever writes [`PaymentState::Success`]; the
/// other values exist so records imported from older account documents stay
/// representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    /// Payment verified and credited.
    Success,
    /// Payment initiated but not settled.
    Pending,
    /// Payment failed at the provider.
    Failed,
}

/// One settled purchase. Immutable once appended to an account's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Amount paid, in paise (minor units).
    pub amount_paise: u64,
    /// ISO currency code.
    pub currency: String,
    /// Provider-assigned payment handle, unique per successful transaction.
    pub payment_id: String,
    /// Settlement state.
    pub state: PaymentState,
    /// Tier activated by this purchase.
    pub plan_purchased: PlanCategory,
    /// When the record was committed.
    pub timestamp: DateTime<Utc>,
}

/// A registered paying account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Opaque unique identifier.
    pub id: AccountId,
    /// Currently active tier. Overwritten, not merged, on each purchase.
    pub plan_category: PlanCategory,
    /// Consumable job-application credits.
    pub credit_balance: u64,
    /// Append-only purchase history, insertion order = chronological order.
    pub payment_history: Vec<PaymentRecord>,
    /// Job applications submitted so far (free-quota counter).
    pub jobs_applied: u32,
}

impl Account {
    /// Create a freshly provisioned account with no plan and no credits.
    #[must_use]
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            plan_category: PlanCategory::None,
            credit_balance: 0,
            payment_history: Vec::new(),
            jobs_applied: 0,
        }
    }

    /// Whether this account's plan unlocks gated features.
    #[must_use]
    pub fn has_access(&self) -> bool {
        self.plan_category.grants_access()
    }

    /// Whether a payment with this provider handle has already been credited.
    #[must_use]
    pub fn has_processed(&self, payment_id: &str) -> bool {
        self.payment_history
            .iter()
            .any(|record| record.payment_id == payment_id)
    }
}
