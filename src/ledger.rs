//! In-memory account ledger.
//!
//! The ledger is the only holder of mutable account state. All plan/credit
//! mutations go through [`Ledger::commit_payment`], which applies the balance
//! increment, the tier overwrite, and the history append as one unit under a
//! single write lock. Concurrent verifications for the same account therefore
//! serialize instead of racing a read-modify-write, and a duplicate provider
//! payment handle commits nothing.

use crate::account::{Account, AccountId, PaymentRecord, PaymentState};
use crate::error::{Error, Result};
use crate::plan::PlanCategory;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// The ledger mutation requested by a verified payment.
#[derive(Debug, Clone)]
pub struct PaymentCommit {
    /// Provider-assigned payment handle.
    pub payment_id: String,
    /// Credits granted by the purchased plan.
    pub credits: u32,
    /// Tier the purchase activates.
    pub category: PlanCategory,
    /// Amount paid, in paise.
    pub amount_paise: u64,
    /// ISO currency code.
    pub currency: String,
}

/// Outcome of a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The mutation was applied.
    Applied {
        /// Balance after the commit.
        credit_balance: u64,
        /// Tier after the commit.
        plan_category: PlanCategory,
    },
    /// This payment handle was already credited; nothing changed.
    AlreadyProcessed {
        /// Current balance.
        credit_balance: u64,
        /// Current tier.
        plan_category: PlanCategory,
    },
}

impl CommitOutcome {
    /// True if this outcome is a replay of an earlier commit.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::AlreadyProcessed { .. })
    }

    /// Credit balance after the call, applied or not.
    #[must_use]
    pub fn credit_balance(&self) -> u64 {
        match self {
            Self::Applied { credit_balance, .. }
            | Self::AlreadyProcessed { credit_balance, .. } => *credit_balance,
        }
    }

    /// Plan category after the call, applied or not.
    #[must_use]
    pub fn plan_category(&self) -> PlanCategory {
        match self {
            Self::Applied { plan_category, .. }
            | Self::AlreadyProcessed { plan_category, .. } => *plan_category,
        }
    }
}

/// Shared in-memory account store.
///
/// Clone handles share the same underlying map.
#[derive(Clone, Default)]
pub struct Ledger {
    inner: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision an account. Used by the external registration flow; the
    /// payment surface never creates accounts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the id is already taken.
    pub fn insert_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.inner.write();
        if accounts.contains_key(&account.id) {
            return Err(Error::Persistence(format!(
                "account already exists: {}",
                account.id
            )));
        }
        accounts.insert(account.id.clone(), account);
        Ok(())
    }

    /// Fetch a snapshot of an account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if no such account exists.
    pub fn account(&self, id: &str) -> Result<Account> {
        self.inner
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))
    }

    /// Current tier and credit balance. Pure read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if no such account exists.
    pub fn current_plan(&self, id: &str) -> Result<(PlanCategory, u64)> {
        let accounts = self.inner.read();
        let account = accounts
            .get(id)
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))?;
        Ok((account.plan_category, account.credit_balance))
    }

    /// Chronologically ordered payment history. Pure read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if no such account exists.
    pub fn payment_history(&self, id: &str) -> Result<Vec<PaymentRecord>> {
        let accounts = self.inner.read();
        let account = accounts
            .get(id)
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))?;
        Ok(account.payment_history.clone())
    }

    /// Apply a verified payment to an account.
    ///
    /// The duplicate check and all three field changes happen under one write
    /// lock: either the balance increment, tier overwrite, and history append
    /// are all visible afterwards, or (for a replayed handle) none are.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if no such account exists.
    pub fn commit_payment(&self, id: &str, commit: &PaymentCommit) -> Result<CommitOutcome> {
        let mut accounts = self.inner.write();
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| Error::AccountNotFound(id.to_string()))?;

        if account.has_processed(&commit.payment_id) {
            return Ok(CommitOutcome::AlreadyProcessed {
                credit_balance: account.credit_balance,
                plan_category: account.plan_category,
            });
        }

        account.credit_balance += u64::from(commit.credits);
        account.plan_category = commit.category;
        account.payment_history.push(PaymentRecord {
            amount_paise: commit.amount_paise,
            currency: commit.currency.clone(),
            payment_id: commit.payment_id.clone(),
            state: PaymentState::Success,
            plan_purchased: commit.category,
            timestamp: Utc::now(),
        });

        Ok(CommitOutcome::Applied {
            credit_balance: account.credit_balance,
            plan_category: account.plan_category,
        })
    }

    /// Number of provisioned accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// True if no accounts are provisioned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn gold_commit(payment_id: &str) -> PaymentCommit {
        PaymentCommit {
            payment_id: payment_id.to_string(),
            credits: 25,
            category: PlanCategory::Gold,
            amount_paise: 29_900,
            currency: "INR".to_string(),
        }
    }

    fn ledger_with_account(id: &str) -> Ledger {
        let ledger = Ledger::new();
        ledger
            .insert_account(Account::new(id.to_string()))
            .expect("insert");
        ledger
    }

    #[test]
    fn test_commit_applies_all_three_fields() {
        let ledger = ledger_with_account("acct_1");

        let outcome = ledger
            .commit_payment("acct_1", &gold_commit("pay_1"))
            .expect("commit");
        assert_eq!(
            outcome,
            CommitOutcome::Applied {
                credit_balance: 25,
                plan_category: PlanCategory::Gold,
            }
        );

        let account = ledger.account("acct_1").expect("account");
        assert_eq!(account.credit_balance, 25);
        assert_eq!(account.plan_category, PlanCategory::Gold);
        assert_eq!(account.payment_history.len(), 1);
        assert_eq!(account.payment_history[0].state, PaymentState::Success);
        assert_eq!(account.payment_history[0].payment_id, "pay_1");
    }

    #[test]
    fn test_duplicate_handle_commits_nothing() {
        let ledger = ledger_with_account("acct_1");

        ledger
            .commit_payment("acct_1", &gold_commit("pay_1"))
            .expect("first commit");
        let outcome = ledger
            .commit_payment("acct_1", &gold_commit("pay_1"))
            .expect("replay");

        assert!(outcome.is_duplicate());
        assert_eq!(outcome.credit_balance(), 25);

        let account = ledger.account("acct_1").expect("account");
        assert_eq!(account.credit_balance, 25);
        assert_eq!(account.payment_history.len(), 1);
    }

    #[test]
    fn test_repurchase_overwrites_tier_and_adds_credits() {
        let ledger = ledger_with_account("acct_1");

        ledger
            .commit_payment(
                "acct_1",
                &PaymentCommit {
                    payment_id: "pay_1".to_string(),
                    credits: 10,
                    category: PlanCategory::Silver,
                    amount_paise: 19_900,
                    currency: "INR".to_string(),
                },
            )
            .expect("silver");
        let outcome = ledger
            .commit_payment(
                "acct_1",
                &PaymentCommit {
                    payment_id: "pay_2".to_string(),
                    credits: 25,
                    category: PlanCategory::Gold,
                    amount_paise: 29_900,
                    currency: "INR".to_string(),
                },
            )
            .expect("gold");

        // Last write wins for the tier; credits are additive.
        assert_eq!(outcome.plan_category(), PlanCategory::Gold);
        assert_eq!(outcome.credit_balance(), 35);

        let history = ledger.payment_history("acct_1").expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].plan_purchased, PlanCategory::Silver);
        assert_eq!(history[1].plan_purchased, PlanCategory::Gold);
    }

    #[test]
    fn test_unknown_account() {
        let ledger = Ledger::new();
        let err = ledger
            .commit_payment("ghost", &gold_commit("pay_1"))
            .expect_err("must fail");
        assert!(matches!(err, Error::AccountNotFound(_)));
        assert!(ledger.current_plan("ghost").is_err());
    }

    #[test]
    fn test_duplicate_provisioning_rejected() {
        let ledger = ledger_with_account("acct_1");
        let err = ledger
            .insert_account(Account::new("acct_1".to_string()))
            .expect_err("duplicate id");
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn test_concurrent_commits_do_not_lose_updates() {
        let ledger = ledger_with_account("acct_1");

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    ledger
                        .commit_payment("acct_1", &gold_commit(&format!("pay_{i}")))
                        .expect("commit")
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }

        let account = ledger.account("acct_1").expect("account");
        assert_eq!(account.credit_balance, 16 * 25);
        assert_eq!(account.payment_history.len(), 16);
    }

    #[test]
    fn test_concurrent_replays_credit_once() {
        let ledger = ledger_with_account("acct_1");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    ledger
                        .commit_payment("acct_1", &gold_commit("pay_same"))
                        .expect("commit")
                })
            })
            .collect();
        let outcomes: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect();

        let applied = outcomes.iter().filter(|o| !o.is_duplicate()).count();
        assert_eq!(applied, 1);

        let account = ledger.account("acct_1").expect("account");
        assert_eq!(account.credit_balance, 25);
        assert_eq!(account.payment_history.len(), 1);
    }
}
