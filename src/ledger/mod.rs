//! Account ledger boundary.
//!
//! The engine never settles payments itself: the gateway debits the
//! card price after a successful join and credits the prize after a
//! successful claim, through this trait. Both mutations return the
//! authoritative post-transaction balance computed by the ledger, so
//! callers broadcast that value instead of recomputing one from a
//! possibly stale read.

use async_trait::async_trait;

use crate::game::session::{Credits, UserId};

pub mod errors;
pub mod memory;

pub use errors::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;

/// Credit bookkeeping collaborator.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Current balance for a user.
    async fn balance(&self, user_id: &UserId) -> LedgerResult<Credits>;

    /// Remove credits. Fails on unknown account, non-positive amount,
    /// or insufficient balance; returns the new balance.
    async fn debit(&self, user_id: &UserId, amount: Credits) -> LedgerResult<Credits>;

    /// Add credits. Fails on unknown account or non-positive amount;
    /// returns the new balance.
    async fn credit(&self, user_id: &UserId, amount: Credits) -> LedgerResult<Credits>;
}
