//! Order issuance and the pending-order registry.
//!
//! Creating an order touches no local ledger state: the provider-side order
//! resource is the only side effect, plus a server-held record of the
//! purchase intent keyed by the provider's order handle. Verification later
//! recovers the plan parameters from that record instead of trusting the
//! client to repeat them.

use crate::error::{Error, Result};
use crate::event::{LedgerEvent, LedgerEventsSender};
use crate::payment::provider::{OrderNotes, OrderRequest, PaymentProvider};
use crate::plan::{PlanCatalog, PlanCategory};
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

/// Provider receipt identifiers must stay under this ceiling.
const RECEIPT_MAX_LEN: usize = 40;

/// Default pending-order registry capacity.
///
/// Abandoned checkouts would otherwise grow the registry without bound. An
/// evicted intent makes its (never-paid, or extremely stale) order
/// unverifiable, which at this capacity requires thousands of newer orders
/// between checkout and confirmation.
const DEFAULT_PENDING_CAPACITY: usize = 10_000;

/// Client-requested purchase parameters, already schema-validated at the
/// HTTP boundary.
#[derive(Debug, Clone)]
pub struct PurchaseParams {
    /// Catalog plan id (e.g. "gold").
    pub plan_id: String,
    /// Tier the client claims to be buying.
    pub plan_category: PlanCategory,
    /// Price in whole rupees.
    pub amount_rupees: u64,
    /// Credits the client claims the plan grants.
    pub credits: u32,
}

/// Server-held purchase intent, captured at order creation.
#[derive(Debug, Clone)]
pub struct PurchaseIntent {
    /// Account the order was issued for.
    pub account_id: String,
    /// Catalog plan id.
    pub plan_id: String,
    /// Tier being purchased.
    pub plan_category: PlanCategory,
    /// Amount in paise.
    pub amount_paise: u64,
    /// Credits to grant on verification.
    pub credits: u32,
    /// ISO currency code the order was created in.
    pub currency: String,
    /// Receipt identifier sent to the provider.
    pub receipt: String,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

/// Registry of orders awaiting payment confirmation, keyed by the
/// provider-assigned order handle.
///
/// Bounded LRU; clone handles share the same registry.
#[derive(Clone)]
pub struct PendingOrders {
    inner: Arc<Mutex<LruCache<String, PurchaseIntent>>>,
}

impl PendingOrders {
    /// Create a registry with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PENDING_CAPACITY)
    }

    /// Create a registry with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(cap))),
        }
    }

    /// Record the intent behind a freshly created order.
    pub fn insert(&self, order_id: String, intent: PurchaseIntent) {
        self.inner.lock().put(order_id, intent);
    }

    /// Look up the intent behind an order handle.
    #[must_use]
    pub fn get(&self, order_id: &str) -> Option<PurchaseIntent> {
        self.inner.lock().get(order_id).cloned()
    }

    /// Drop an order's intent once its payment has been committed.
    pub fn remove(&self, order_id: &str) {
        self.inner.lock().pop(order_id);
    }

    /// Number of orders awaiting confirmation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// True if no orders await confirmation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for PendingOrders {
    fn default() -> Self {
        Self::new()
    }
}

/// A created order, as returned to the client for the checkout widget.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    /// Provider-assigned order handle.
    pub order_id: String,
    /// Amount to pay, in paise.
    pub amount_paise: u64,
    /// ISO currency code.
    pub currency: String,
    /// Publishable provider key for the widget.
    pub key_id: String,
}

/// Creates provider-side orders and records purchase intents.
pub struct OrderIssuer<P> {
    provider: Arc<P>,
    catalog: PlanCatalog,
    pending: PendingOrders,
    currency: String,
    events: LedgerEventsSender,
}

impl<P: PaymentProvider> OrderIssuer<P> {
    /// Create an order issuer.
    pub fn new(
        provider: Arc<P>,
        catalog: PlanCatalog,
        pending: PendingOrders,
        currency: String,
        events: LedgerEventsSender,
    ) -> Self {
        Self {
            provider,
            catalog,
            pending,
            currency,
            events,
        }
    }

    /// Create a provider-side order for a plan purchase.
    ///
    /// Validates the requested parameters against the plan catalog, converts
    /// the rupee price to paise, derives a receipt identifier, and records
    /// the purchase intent for later verification. No ledger state changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the parameters are missing, zero, or
    /// disagree with the catalog; [`Error::OrderCreation`] if the provider
    /// call fails (nothing to roll back).
    pub async fn create_order(
        &self,
        account_id: &str,
        params: &PurchaseParams,
    ) -> Result<CreatedOrder> {
        self.validate(params)?;

        let amount_paise = params.amount_rupees * 100;
        let receipt = derive_receipt(account_id, Utc::now().timestamp_millis());

        let request = OrderRequest {
            amount: amount_paise,
            currency: self.currency.clone(),
            receipt: receipt.clone(),
            notes: OrderNotes {
                account_id: account_id.to_string(),
                plan_id: params.plan_id.clone(),
                plan_category: params.plan_category.to_string(),
                credits: params.credits,
            },
        };

        let order = self.provider.create_order(request).await?;
        debug!(
            "Provider order {} created (receipt={receipt})",
            order.order_id
        );

        self.pending.insert(
            order.order_id.clone(),
            PurchaseIntent {
                account_id: account_id.to_string(),
                plan_id: params.plan_id.clone(),
                plan_category: params.plan_category,
                amount_paise,
                credits: params.credits,
                currency: self.currency.clone(),
                receipt,
                created_at: Utc::now(),
            },
        );

        info!(
            "Order {} created for account {account_id} ({} plan)",
            order.order_id, params.plan_category
        );
        let _ = self.events.send(LedgerEvent::OrderCreated {
            account_id: account_id.to_string(),
            order_id: order.order_id.clone(),
            plan_category: params.plan_category,
        });

        Ok(CreatedOrder {
            order_id: order.order_id,
            amount_paise: order.amount,
            currency: order.currency,
            key_id: self.provider.key_id().to_string(),
        })
    }

    fn validate(&self, params: &PurchaseParams) -> Result<()> {
        if params.plan_id.is_empty() {
            return Err(Error::Validation("plan id is missing".to_string()));
        }
        if params.amount_rupees == 0 {
            return Err(Error::Validation("amount must be non-zero".to_string()));
        }
        if params.credits == 0 {
            return Err(Error::Validation("credits must be non-zero".to_string()));
        }
        if params.plan_category == PlanCategory::None {
            return Err(Error::Validation(
                "cannot purchase the NONE category".to_string(),
            ));
        }

        let plan = self.catalog.find(&params.plan_id).ok_or_else(|| {
            Error::Validation(format!("unknown plan id: {}", params.plan_id))
        })?;
        if plan.category != params.plan_category
            || plan.price_rupees != params.amount_rupees
            || plan.credits != params.credits
        {
            return Err(Error::Validation(format!(
                "plan details disagree with the catalog entry for '{}'",
                params.plan_id
            )));
        }
        Ok(())
    }
}

/// Derive a receipt identifier from the tail of the account id and a
/// millisecond timestamp.
///
/// Two purchases by the same account within the same millisecond would
/// collide; human-driven checkout cadence makes that acceptable.
fn derive_receipt(account_id: &str, timestamp_millis: i64) -> String {
    let chars = account_id.chars().count();
    let tail: String = account_id.chars().skip(chars.saturating_sub(6)).collect();
    let mut receipt = format!("rcpt_{tail}_{timestamp_millis}");
    receipt.truncate(RECEIPT_MAX_LEN);
    receipt
}
