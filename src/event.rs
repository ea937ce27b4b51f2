//! Ledger event system.

use crate::plan::PlanCategory;
use tokio::sync::broadcast;

/// Events emitted by the payment core.
#[derive(Debug, Clone)]
pub enum LedgerEvent {
    /// A provider-side order was created.
    OrderCreated {
        /// Paying account.
        account_id: String,
        /// Provider-assigned order handle.
        order_id: String,
        /// Tier being purchased.
        plan_category: PlanCategory,
    },

    /// A payment was verified and the ledger updated.
    PaymentVerified {
        /// Paying account.
        account_id: String,
        /// Provider-assigned payment handle.
        payment_id: String,
        /// Tier now active.
        plan_category: PlanCategory,
        /// Credit balance after the commit.
        credit_balance: u64,
        /// True if this confirmation was a replay of an earlier commit.
        replayed: bool,
    },

    /// A payment confirmation was rejected.
    VerificationRejected {
        /// Account that submitted the confirmation.
        account_id: String,
        /// Order handle named by the confirmation.
        order_id: String,
        /// Machine-readable rejection kind.
        reason: &'static str,
    },

    /// The service is shutting down.
    ShuttingDown,
}

/// Channel for receiving ledger events.
pub type LedgerEventsChannel = broadcast::Receiver<LedgerEvent>;

/// Sender for ledger events.
pub type LedgerEventsSender = broadcast::Sender<LedgerEvent>;

/// Create a new event channel pair.
#[must_use]
pub fn create_event_channel() -> (LedgerEventsSender, LedgerEventsChannel) {
    broadcast::channel(256)
}
