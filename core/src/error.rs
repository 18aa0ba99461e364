use thiserror::Error;

use crate::types::{LoanId, Money};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid score submission: {reason}")]
    InvalidScore { reason: String },

    #[error("Corrupt session state: {reason}")]
    CorruptSession { reason: String },

    #[error("Session slot '{slot}' not found")]
    SessionNotFound { slot: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// Why an action was refused. A rejected action leaves the game state
/// exactly as it was; rejections are reported as data, not as `Err`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("the game is over; reset to play again")]
    GameOver,

    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Money },

    #[error("amount must be a finite number, got {amount}")]
    NonFiniteAmount { amount: Money },

    #[error("insufficient cash: need {amount:.2}, have {cash:.2}")]
    InsufficientCash { amount: Money, cash: Money },

    #[error("no active loan with id '{loan_id}'")]
    UnknownLoan { loan_id: LoanId },

    #[error("a loan with id '{loan_id}' already exists")]
    DuplicateLoan { loan_id: LoanId },

    #[error("invalid loan terms: {reason}")]
    InvalidLoanTerms { reason: String },
}
