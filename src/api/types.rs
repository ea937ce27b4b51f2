//! Wire types for the payment endpoints.

use crate::account::{PaymentRecord, PaymentState};
use crate::plan::PlanCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /payments/purchase`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Catalog plan id (e.g. "gold").
    pub plan_id: String,
    /// Tier being purchased.
    pub plan_category: PlanCategory,
    /// Price in whole rupees.
    pub amount: u64,
    /// Credits the plan grants.
    pub credits: u32,
}

/// Response of `POST /payments/purchase`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Provider-assigned order handle.
    pub order_id: String,
    /// Amount to pay, in paise.
    pub amount: u64,
    /// ISO currency code.
    pub currency: String,
    /// Publishable provider key for the checkout widget.
    pub key: String,
}

/// Body of `POST /payments/verify`.
///
/// Plan parameters are deliberately absent: the purchase intent recorded at
/// order creation is authoritative. Unknown fields a legacy client still
/// sends are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Provider-assigned order handle.
    pub order_id: String,
    /// Provider-assigned payment handle.
    pub payment_id: String,
    /// Hex HMAC over `orderId|paymentId`.
    pub signature: String,
}

/// Response of `POST /payments/verify`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Credit balance after the commit.
    pub credit_balance: u64,
    /// Tier now active.
    pub plan_category: PlanCategory,
}

/// Response of `GET /payments/current-plan`.
///
/// Carries the access-gate verdicts alongside the raw tier/balance pair so
/// gated features (classes, videos, job applications) need no policy logic
/// of their own.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPlanResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Currently active tier.
    pub plan_category: PlanCategory,
    /// Consumable credit balance.
    pub credit_balance: u64,
    /// Whether the plan unlocks gated features.
    pub has_access: bool,
    /// Whether the account may submit another job application.
    pub can_apply: bool,
}

/// One entry of `GET /payments/history`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecordDto {
    /// Amount paid, in paise.
    pub amount_paise: u64,
    /// ISO currency code.
    pub currency: String,
    /// Provider-assigned payment handle.
    pub payment_id: String,
    /// Settlement state.
    pub status: PaymentState,
    /// Tier activated by this purchase.
    pub plan_purchased: PlanCategory,
    /// When the record was committed.
    pub date: DateTime<Utc>,
}

impl From<PaymentRecord> for PaymentRecordDto {
    fn from(record: PaymentRecord) -> Self {
        Self {
            amount_paise: record.amount_paise,
            currency: record.currency,
            payment_id: record.payment_id,
            status: record.state,
            plan_purchased: record.plan_purchased,
            date: record.timestamp,
        }
    }
}

/// Response of `GET /payments/history`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Chronologically ordered purchase records.
    pub payment_history: Vec<PaymentRecordDto>,
}
