//! In-memory ledger implementation.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use super::{
    CreditLedger,
    errors::{LedgerError, LedgerResult},
};
use crate::game::session::{Credits, UserId};

/// Credit ledger backed by a process-local map. The reference
/// implementation for tests and single-process hosts; a durable ledger
/// service plugs in behind the same trait.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    accounts: Arc<RwLock<HashMap<UserId, Credits>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or overwrite) an account with a starting balance.
    pub async fn open_account(&self, user_id: &UserId, balance: Credits) {
        let mut accounts = self.accounts.write().await;
        accounts.insert(user_id.clone(), balance);
    }
}

#[async_trait]
impl CreditLedger for InMemoryLedger {
    async fn balance(&self, user_id: &UserId) -> LedgerResult<Credits> {
        let accounts = self.accounts.read().await;
        accounts
            .get(user_id)
            .copied()
            .ok_or_else(|| LedgerError::AccountNotFound(user_id.clone()))
    }

    async fn debit(&self, user_id: &UserId, amount: Credits) -> LedgerResult<Credits> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let mut accounts = self.accounts.write().await;
        let balance = accounts
            .get_mut(user_id)
            .ok_or_else(|| LedgerError::AccountNotFound(user_id.clone()))?;
        if *balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: *balance,
                required: amount,
            });
        }

        *balance -= amount;
        Ok(*balance)
    }

    async fn credit(&self, user_id: &UserId, amount: Credits) -> LedgerResult<Credits> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let mut accounts = self.accounts.write().await;
        let balance = accounts
            .get_mut(user_id)
            .ok_or_else(|| LedgerError::AccountNotFound(user_id.clone()))?;

        *balance += amount;
        Ok(*balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_debit_returns_post_transaction_balance() {
        let ledger = InMemoryLedger::new();
        let alice = "alice".to_string();
        ledger.open_account(&alice, 100).await;

        assert_eq!(ledger.debit(&alice, 30).await.unwrap(), 70);
        assert_eq!(ledger.balance(&alice).await.unwrap(), 70);
    }

    #[tokio::test]
    async fn test_debit_more_than_available_fails_without_mutation() {
        let ledger = InMemoryLedger::new();
        let alice = "alice".to_string();
        ledger.open_account(&alice, 10).await;

        assert_eq!(
            ledger.debit(&alice, 25).await.unwrap_err(),
            LedgerError::InsufficientBalance {
                available: 10,
                required: 25,
            }
        );
        assert_eq!(ledger.balance(&alice).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_credit_returns_post_transaction_balance() {
        let ledger = InMemoryLedger::new();
        let alice = "alice".to_string();
        ledger.open_account(&alice, 5).await;

        assert_eq!(ledger.credit(&alice, 500).await.unwrap(), 505);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let ledger = InMemoryLedger::new();
        let ghost = "ghost".to_string();
        assert_eq!(
            ledger.balance(&ghost).await.unwrap_err(),
            LedgerError::AccountNotFound(ghost.clone())
        );
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let ledger = InMemoryLedger::new();
        let alice = "alice".to_string();
        ledger.open_account(&alice, 100).await;

        assert_eq!(
            ledger.debit(&alice, 0).await.unwrap_err(),
            LedgerError::InvalidAmount(0)
        );
        assert_eq!(
            ledger.credit(&alice, -5).await.unwrap_err(),
            LedgerError::InvalidAmount(-5)
        );
    }
}
