//! Payment verification and ledger commit.
//!
//! This is the system's sole trust boundary: no ledger mutation happens
//! without a matching HMAC, and each provider payment handle is credited at
//! most once regardless of how many times the confirmation is replayed.

use crate::error::{Error, Result};
use crate::event::{LedgerEvent, LedgerEventsSender};
use crate::ledger::{Ledger, PaymentCommit};
use crate::payment::cache::ProcessedCache;
use crate::payment::order::PendingOrders;
use crate::payment::signature;
use crate::plan::PlanCategory;
use tracing::{debug, info, warn};

/// Result of a successful verification, echoed to the client for immediate
/// UI reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedPayment {
    /// Credit balance after the commit.
    pub credit_balance: u64,
    /// Tier now active.
    pub plan_category: PlanCategory,
    /// True if this confirmation had already been committed earlier.
    pub replayed: bool,
}

/// Verifies proof-of-payment signatures and commits the resulting ledger
/// mutation exactly once per payment handle.
pub struct PaymentVerifier {
    key_secret: String,
    ledger: Ledger,
    pending: PendingOrders,
    processed: ProcessedCache,
    events: LedgerEventsSender,
}

impl PaymentVerifier {
    /// Create a verifier sharing the issuer's pending-order registry.
    pub fn new(
        key_secret: String,
        ledger: Ledger,
        pending: PendingOrders,
        processed: ProcessedCache,
        events: LedgerEventsSender,
    ) -> Self {
        Self {
            key_secret,
            ledger,
            pending,
            processed,
            events,
        }
    }

    /// Authenticate a payment confirmation and apply it to the ledger.
    ///
    /// The checks run in trust order:
    ///
    /// 1. Recompute the HMAC over `orderId|paymentId`; mismatch is a hard
    ///    rejection before anything else is looked at.
    /// 2. Replays of an already-committed handle return the current state
    ///    without touching the ledger (fast path via the processed cache,
    ///    authoritative check inside the commit).
    /// 3. The purchase intent is recovered from the server-held registry;
    ///    the client's word is never consulted for plan parameters.
    /// 4. Balance increment, tier overwrite, and history append commit as
    ///    one unit.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSignature`] on any MAC mismatch,
    /// [`Error::UnknownOrder`] if the order was never issued here,
    /// [`Error::Validation`] if the order belongs to a different account,
    /// [`Error::AccountNotFound`] if the account was never provisioned.
    pub fn verify_and_commit(
        &self,
        account_id: &str,
        order_id: &str,
        payment_id: &str,
        signature_hex: &str,
    ) -> Result<VerifiedPayment> {
        if let Err(err) =
            signature::verify_order(&self.key_secret, order_id, payment_id, signature_hex)
        {
            warn!(
                "Rejected payment confirmation for order {order_id}: signature mismatch \
                 (possible tamper attempt)"
            );
            self.reject(account_id, order_id, err.kind());
            return Err(err);
        }

        // Replay fast path. The ledger re-checks under its commit lock, so a
        // cache miss on a real duplicate is still caught below.
        if self.processed.contains(payment_id) {
            let (plan_category, credit_balance) = self.ledger.current_plan(account_id)?;
            debug!("Payment {payment_id} already committed; returning current state");
            let _ = self.events.send(LedgerEvent::PaymentVerified {
                account_id: account_id.to_string(),
                payment_id: payment_id.to_string(),
                plan_category,
                credit_balance,
                replayed: true,
            });
            return Ok(VerifiedPayment {
                credit_balance,
                plan_category,
                replayed: true,
            });
        }

        let Some(intent) = self.pending.get(order_id) else {
            warn!("Rejected payment confirmation for unknown order {order_id}");
            self.reject(account_id, order_id, "unknown_order");
            return Err(Error::UnknownOrder(order_id.to_string()));
        };

        if intent.account_id != account_id {
            warn!("Order {order_id} was issued to a different account");
            self.reject(account_id, order_id, "validation_error");
            return Err(Error::Validation(
                "order was issued to a different account".to_string(),
            ));
        }

        let outcome = self.ledger.commit_payment(
            account_id,
            &PaymentCommit {
                payment_id: payment_id.to_string(),
                credits: intent.credits,
                category: intent.plan_category,
                amount_paise: intent.amount_paise,
                currency: intent.currency.clone(),
            },
        )?;

        self.processed.insert(payment_id.to_string());
        self.pending.remove(order_id);

        let replayed = outcome.is_duplicate();
        if replayed {
            debug!("Payment {payment_id} was already committed");
        } else {
            info!(
                "Payment {payment_id} verified for account {account_id}: {} plan, balance {}",
                outcome.plan_category(),
                outcome.credit_balance()
            );
        }
        let _ = self.events.send(LedgerEvent::PaymentVerified {
            account_id: account_id.to_string(),
            payment_id: payment_id.to_string(),
            plan_category: outcome.plan_category(),
            credit_balance: outcome.credit_balance(),
            replayed,
        });

        Ok(VerifiedPayment {
            credit_balance: outcome.credit_balance(),
            plan_category: outcome.plan_category(),
            replayed,
        })
    }

    /// Processed-payment cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> crate::payment::cache::CacheStats {
        self.processed.stats()
    }

    fn reject(&self, account_id: &str, order_id: &str, reason: &'static str) {
        let _ = self.events.send(LedgerEvent::VerificationRejected {
            account_id: account_id.to_string(),
            order_id: order_id.to_string(),
            reason,
        });
    }
}
