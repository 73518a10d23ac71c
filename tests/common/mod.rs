// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use loanbook::application::LoanService;
use loanbook::domain::{Loan, LoanForm};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LoanService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LoanService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Test fixture: a fully filled add-loan form
pub fn loan_form(title: &str, amount: &str, currency: &str) -> LoanForm {
    LoanForm {
        title: title.to_string(),
        amount: amount.to_string(),
        currency: currency.to_string(),
        interest_rate: "3.5".to_string(),
        monthly_payment: "1000".to_string(),
        month: "3".to_string(),
        day: "15".to_string(),
        year: "2024".to_string(),
        receipt: None,
    }
}

/// Test fixture: a handful of loans in different currencies
pub struct StandardLoans;

impl StandardLoans {
    /// Car (THB 500,000), Laptop (USD 1,500), Holiday (EUR 2,000)
    pub async fn create(service: &LoanService) -> Result<Vec<Loan>> {
        let car = service.add_loan(loan_form("Car", "500,000", "THB")).await?;
        let laptop = service.add_loan(loan_form("Laptop", "1500", "USD")).await?;
        let holiday = service.add_loan(loan_form("Holiday", "2000.00", "EUR")).await?;
        Ok(vec![car, laptop, holiday])
    }
}
