use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{BasisPoints, Cents, Currency, MAX_AMOUNT_CENTS};

pub type LoanId = Uuid;

/// Validated input for a new loan. Produced by [`super::LoanForm::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub title: String,
    pub amount_cents: Cents,
    pub currency: Currency,
    pub interest_rate_bps: BasisPoints,
    pub monthly_payment_cents: Cents,
    pub start_date: NaiveDate,
    pub receipt_url: Option<String>,
}

/// A stored loan record that breaks one of the rules new loans follow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoanError {
    #[error("title is empty")]
    EmptyTitle,

    #[error("amount {0} is out of range")]
    AmountOutOfRange(Cents),

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("monthly payment {0} is out of range")]
    PaymentOutOfRange(Cents),

    #[error("remaining balance {remaining} is outside 0..={amount}")]
    RemainingOutOfRange { remaining: Cents, amount: Cents },
}

/// A tracked personal loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub title: String,
    /// Original principal in cents (always positive)
    pub amount_cents: Cents,
    pub currency: Currency,
    pub interest_rate_bps: BasisPoints,
    pub monthly_payment_cents: Cents,
    pub start_date: NaiveDate,
    pub next_payment_due: NaiveDate,
    /// Outstanding balance, starts out equal to the principal
    pub remaining_cents: Cents,
    /// Locator of the receipt image, if one was attached
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    pub fn new(input: NewLoan) -> Self {
        assert!(input.amount_cents > 0, "Loan amount must be positive");
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            amount_cents: input.amount_cents,
            currency: input.currency,
            interest_rate_bps: input.interest_rate_bps,
            monthly_payment_cents: input.monthly_payment_cents,
            start_date: input.start_date,
            next_payment_due: input.start_date,
            remaining_cents: input.amount_cents,
            receipt_url: input.receipt_url,
            created_at: Utc::now(),
        }
    }

    /// A loan is active while something is still owed on it.
    pub fn is_active(&self) -> bool {
        self.remaining_cents > 0
    }

    pub fn has_receipt(&self) -> bool {
        self.receipt_url.is_some()
    }

    /// Check a record that did not come through the add form, such as one
    /// read back from a snapshot.
    pub fn check(&self) -> Result<(), LoanError> {
        if self.title.trim().is_empty() {
            return Err(LoanError::EmptyTitle);
        }
        if !(1..=MAX_AMOUNT_CENTS).contains(&self.amount_cents) {
            return Err(LoanError::AmountOutOfRange(self.amount_cents));
        }
        if self.interest_rate_bps < 0 {
            return Err(LoanError::Negative("interest rate"));
        }
        if !(0..=MAX_AMOUNT_CENTS).contains(&self.monthly_payment_cents) {
            return Err(LoanError::PaymentOutOfRange(self.monthly_payment_cents));
        }
        if !(0..=self.amount_cents).contains(&self.remaining_cents) {
            return Err(LoanError::RemainingOutOfRange {
                remaining: self.remaining_cents,
                amount: self.amount_cents,
            });
        }
        Ok(())
    }
}
