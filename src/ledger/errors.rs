//! Ledger error types.

use thiserror::Error;

use crate::game::session::{Credits, UserId};

/// Ledger errors
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LedgerError {
    /// No account exists for the user
    #[error("No account for user {0}")]
    AccountNotFound(UserId),

    /// Insufficient balance
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        available: Credits,
        required: Credits,
    },

    /// Invalid amount (must be positive)
    #[error("Invalid amount: {0}")]
    InvalidAmount(Credits),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
