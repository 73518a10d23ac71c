use thiserror::Error;

use crate::domain::{FormError, LoanError, LoanId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    #[error("Loan ID prefix '{prefix}' matches {matches} loans, use more characters")]
    AmbiguousLoanId { prefix: String, matches: usize },

    #[error("Loan ID prefix '{0}' is too short (need at least 4 characters)")]
    LoanIdTooShort(String),

    #[error(transparent)]
    InvalidForm(#[from] FormError),

    #[error("Invalid loan record {id}: {source}")]
    InvalidLoan { id: LoanId, source: LoanError },

    #[error("Not logged in")]
    NoProfile,

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
