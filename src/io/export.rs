use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LoanService;
use crate::domain::{Loan, format_cents};

/// Loan book snapshot for full export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub loans: Vec<Loan>,
}

/// Column layout of the loans CSV. The importer reads the same headers.
pub const LOAN_CSV_HEADERS: [&str; 10] = [
    "id",
    "title",
    "amount",
    "currency",
    "interest_rate",
    "monthly_payment",
    "start_date",
    "next_payment_due",
    "remaining",
    "receipt_url",
];

/// Exporter for converting the loan book to various formats
pub struct Exporter<'a> {
    service: &'a LoanService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LoanService) -> Self {
        Self { service }
    }

    /// Export loans to CSV format, amounts as plain decimals
    pub async fn export_loans_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let loans = self.service.list_loans().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(LOAN_CSV_HEADERS)?;

        for loan in &loans {
            csv_writer.write_record(&[
                loan.id.to_string(),
                loan.title.clone(),
                format_cents(loan.amount_cents),
                loan.currency.as_str().to_string(),
                format_cents(loan.interest_rate_bps),
                format_cents(loan.monthly_payment_cents),
                loan.start_date.format("%Y-%m-%d").to_string(),
                loan.next_payment_due.format("%Y-%m-%d").to_string(),
                format_cents(loan.remaining_cents),
                loan.receipt_url.clone().unwrap_or_default(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(loans.len())
    }

    /// Export every loan as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let loans = self.service.list_loans().await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            loans,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
