use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{LedgerSummary, Loan};

/// Everything the dashboard shows: the loan list plus its aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub summary: LedgerSummary,
    pub loans: Vec<Loan>,
}

impl Dashboard {
    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }
}
