use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Cents, Currency, Loan, LoanId, NewLoan};

/// Aggregate figures shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub loan_count: usize,
    pub active_count: usize,
    /// Sum of remaining balances across all loans, regardless of currency
    pub total_remaining: Cents,
    pub by_currency: BTreeMap<Currency, Cents>,
}

/// In-memory store of loans, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LoanLedger {
    loans: Vec<Loan>,
}

impl LoanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from records that were already created.
    pub fn from_loans(loans: Vec<Loan>) -> Self {
        Self { loans }
    }

    /// Create a loan from validated input and append it.
    pub fn add_loan(&mut self, input: NewLoan) -> &Loan {
        self.loans.push(Loan::new(input));
        &self.loans[self.loans.len() - 1]
    }

    /// Remove a loan by id. Unknown ids leave the ledger untouched.
    pub fn delete_loan(&mut self, id: LoanId) -> Option<Loan> {
        let index = self.loans.iter().position(|loan| loan.id == id)?;
        Some(self.loans.remove(index))
    }

    pub fn get(&self, id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|loan| loan.id == id)
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn into_loans(self) -> Vec<Loan> {
        self.loans
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// Saturates at `Cents::MAX` rather than wrapping.
    pub fn total_remaining(&self) -> Cents {
        self.loans
            .iter()
            .fold(0, |total: Cents, loan| total.saturating_add(loan.remaining_cents))
    }

    pub fn active_loans(&self) -> Vec<&Loan> {
        self.loans.iter().filter(|loan| loan.is_active()).collect()
    }

    pub fn remaining_by_currency(&self) -> BTreeMap<Currency, Cents> {
        let mut totals = BTreeMap::new();
        for loan in &self.loans {
            let total: &mut Cents = totals.entry(loan.currency).or_insert(0);
            *total = total.saturating_add(loan.remaining_cents);
        }
        totals
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            loan_count: self.loans.len(),
            active_count: self.active_loans().len(),
            total_remaining: self.total_remaining(),
            by_currency: self.remaining_by_currency(),
        }
    }
}
