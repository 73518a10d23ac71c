use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::io::Read;
use tracing::warn;

use crate::application::{AppError, LoanService};
use crate::domain::LoanForm;
use crate::io::export::LedgerSnapshot;

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Validate everything but store nothing
    pub dry_run: bool,
}

/// One row of a loans CSV. Extra columns (id, remaining, ...) are ignored.
#[derive(Debug, Deserialize)]
struct LoanRow {
    title: String,
    amount: String,
    #[serde(default)]
    currency: String,
    interest_rate: String,
    monthly_payment: String,
    start_date: String,
    #[serde(default)]
    receipt_url: Option<String>,
}

impl LoanRow {
    fn into_form(self) -> Result<LoanForm, ImportError> {
        let date = NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d").map_err(|e| {
            ImportError {
                line: 0,
                field: Some("start_date".to_string()),
                error: format!("Invalid start date '{}': {}", self.start_date, e),
            }
        })?;

        Ok(LoanForm {
            title: self.title,
            amount: self.amount,
            currency: self.currency,
            interest_rate: self.interest_rate,
            monthly_payment: self.monthly_payment,
            month: date.month().to_string(),
            day: date.day().to_string(),
            year: date.year().to_string(),
            receipt: self.receipt_url,
        })
    }
}

/// Importer for loading loans into the loan book
pub struct Importer<'a> {
    service: &'a LoanService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LoanService) -> Self {
        Self { service }
    }

    /// Import loans from CSV. Every row is validated like the add form;
    /// bad rows are reported and the rest still go in.
    pub async fn import_loans_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.deserialize::<LoanRow>().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let row = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let form = match row.into_form() {
                Ok(form) => form,
                Err(e) => {
                    errors.push(ImportError { line, ..e });
                    continue;
                }
            };

            if options.dry_run {
                match form.validate() {
                    Ok(_) => imported += 1,
                    Err(e) => errors.push(ImportError {
                        line,
                        field: None,
                        error: e.to_string(),
                    }),
                }
                continue;
            }

            match self.service.add_loan(form).await {
                Ok(_) => imported += 1,
                Err(AppError::InvalidForm(e)) => errors.push(ImportError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
                Err(e) => return Err(e.into()),
            }
        }

        if !errors.is_empty() {
            warn!(count = errors.len(), "some rows were not imported");
        }

        Ok(ImportResult {
            imported,
            skipped: 0,
            errors,
        })
    }

    /// Restore loans from a JSON snapshot, keeping their original IDs.
    /// Loans that already exist are skipped.
    pub async fn import_full_json<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let snapshot: LedgerSnapshot = serde_json::from_reader(reader)?;

        // Bad records are reported by their position in the snapshot
        let mut errors = Vec::new();
        let mut loans = Vec::with_capacity(snapshot.loans.len());
        for (index, loan) in snapshot.loans.into_iter().enumerate() {
            if let Err(e) = loan.check() {
                errors.push(ImportError {
                    line: index + 1,
                    field: None,
                    error: format!("Loan {}: {}", loan.id, e),
                });
                continue;
            }
            loans.push(loan);
        }

        if !errors.is_empty() {
            warn!(count = errors.len(), "some snapshot loans were not imported");
        }

        if options.dry_run {
            return Ok(ImportResult {
                imported: loans.len(),
                skipped: 0,
                errors,
            });
        }

        let restored = self.service.restore_loans(loans).await?;

        Ok(ImportResult {
            imported: restored.imported,
            skipped: restored.skipped,
            errors,
        })
    }
}
