mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::{StandardLoans, loan_form, test_service};
use loanbook::application::AppError;
use loanbook::Repository;
use loanbook::domain::{Currency, FormError, Loan};
use uuid::Uuid;

#[tokio::test]
async fn test_add_loan_initializes_balance_and_due_date() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let mut form = loan_form("Condo", "1,000,000", "THB");
    form.interest_rate = "4.25".into();
    form.monthly_payment = "12,500.50".into();
    form.receipt = Some("file:///receipts/condo.jpg".into());

    let loan = service.add_loan(form).await?;

    assert_eq!(loan.amount_cents, 100_000_000);
    assert_eq!(loan.remaining_cents, loan.amount_cents);
    assert_eq!(loan.interest_rate_bps, 425);
    assert_eq!(loan.monthly_payment_cents, 1_250_050);
    assert_eq!(loan.currency, Currency::Thb);
    assert_eq!(loan.start_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    assert_eq!(loan.next_payment_due, loan.start_date);
    assert_eq!(loan.receipt_url.as_deref(), Some("file:///receipts/condo.jpg"));

    // Round trip through storage
    let stored = service.get_loan(loan.id).await?;
    assert_eq!(stored.id, loan.id);
    assert_eq!(stored.title, "Condo");
    assert_eq!(stored.remaining_cents, 100_000_000);
    assert_eq!(stored.start_date, loan.start_date);
    assert_eq!(stored.receipt_url, loan.receipt_url);

    Ok(())
}

#[tokio::test]
async fn test_invalid_form_stores_nothing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let mut form = loan_form("Car", "500000", "THB");
    form.title = String::new();
    let result = service.add_loan(form).await;
    assert!(matches!(
        result,
        Err(AppError::InvalidForm(FormError::MissingField("title")))
    ));

    let mut form = loan_form("Car", "500000", "THB");
    form.month = "2".into();
    form.day = "31".into();
    let result = service.add_loan(form).await;
    assert!(matches!(
        result,
        Err(AppError::InvalidForm(FormError::InvalidDate(_)))
    ));

    let result = service.add_loan(loan_form("Car", "0", "THB")).await;
    assert!(matches!(
        result,
        Err(AppError::InvalidForm(FormError::NonPositiveAmount))
    ));

    assert!(service.list_loans().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_loans_listed_in_insertion_order() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.add_loan(loan_form("Zebra", "100", "THB")).await?;
    service.add_loan(loan_form("Apple", "200", "THB")).await?;
    service.add_loan(loan_form("Mango", "300", "THB")).await?;

    let titles: Vec<String> = service
        .list_loans()
        .await?
        .into_iter()
        .map(|l| l.title)
        .collect();
    assert_eq!(titles, vec!["Zebra", "Apple", "Mango"]);

    Ok(())
}

#[tokio::test]
async fn test_delete_loan() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let loans = StandardLoans::create(&service).await?;

    let deleted = service.delete_loan(loans[1].id).await?;
    assert_eq!(deleted.map(|l| l.title), Some("Laptop".to_string()));

    let remaining: Vec<String> = service
        .list_loans()
        .await?
        .into_iter()
        .map(|l| l.title)
        .collect();
    assert_eq!(remaining, vec!["Car", "Holiday"]);

    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_loan_is_noop() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardLoans::create(&service).await?;
    let before = service.list_loans().await?;

    let deleted = service.delete_loan(Uuid::new_v4()).await?;
    assert!(deleted.is_none());

    let after = service.list_loans().await?;
    assert_eq!(before, after);

    Ok(())
}

#[tokio::test]
async fn test_get_unknown_loan_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.get_loan(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::LoanNotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_resolve_loan_id_by_prefix() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let loans = StandardLoans::create(&service).await?;

    let full = loans[0].id.to_string();
    assert_eq!(service.resolve_loan_id(&full).await?, loans[0].id);
    assert_eq!(service.resolve_loan_id(&full[..8]).await?, loans[0].id);
    assert_eq!(
        service.resolve_loan_id(&full[..8].to_uppercase()).await?,
        loans[0].id
    );

    assert!(matches!(
        service.resolve_loan_id("abc").await,
        Err(AppError::LoanIdTooShort(_))
    ));
    assert!(matches!(
        service.resolve_loan_id("zzzzzzzz").await,
        Err(AppError::LoanNotFound(_))
    ));

    // A full UUID resolves even when nothing is stored under it
    let unknown = Uuid::new_v4();
    assert_eq!(service.resolve_loan_id(&unknown.to_string()).await?, unknown);

    Ok(())
}

#[tokio::test]
async fn test_resolve_loan_id_treats_wildcards_literally() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.add_loan(loan_form("Only", "100", "THB")).await?;

    for input in ["%%%%", "____", "%_%_", "0000%", "____-____"] {
        assert!(
            matches!(
                service.resolve_loan_id(input).await,
                Err(AppError::LoanNotFound(_))
            ),
            "'{}' should not resolve",
            input
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_prefix_search_escapes_like_patterns() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let db_path = temp_dir.path().join("prefix.db");
    let repo = Repository::init(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;

    let loan = Loan::new(loan_form("Only", "100", "THB").validate()?);
    repo.save_loan(&loan).await?;

    let full = loan.id.to_string();
    assert_eq!(repo.find_loans_by_id_prefix(&full[..6]).await?.len(), 1);
    assert!(repo.find_loans_by_id_prefix("%").await?.is_empty());
    assert!(repo.find_loans_by_id_prefix("____").await?.is_empty());
    assert!(repo.find_loans_by_id_prefix("\\").await?.is_empty());

    Ok(())
}
