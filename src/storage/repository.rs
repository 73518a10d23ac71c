use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Currency, Loan, LoanId, Profile};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

const LOAN_COLUMNS: &str = "id, title, amount_cents, currency, interest_rate_bps, monthly_payment_cents, start_date, next_payment_due, remaining_cents, receipt_url, created_at";

/// Repository for persisting and querying loans and the current profile.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Loan operations
    // ========================

    /// Append a loan. Its position in the insertion order is assigned here.
    pub async fn save_loan(&self, loan: &Loan) -> Result<()> {
        Self::insert_loan(&self.pool, loan).await
    }

    /// Insert records that keep their own IDs, in one transaction.
    ///
    /// IDs already present (in the table or earlier in `loans`) are skipped.
    /// Returns how many loans were inserted. On error nothing is written.
    pub async fn restore_loans(&self, loans: &[Loan]) -> Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start restore transaction")?;

        let mut inserted = 0;
        for loan in loans {
            let exists = sqlx::query("SELECT 1 FROM loans WHERE id = ?")
                .bind(loan.id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to check for existing loan")?
                .is_some();
            if exists {
                continue;
            }
            Self::insert_loan(&mut *tx, loan).await?;
            inserted += 1;
        }

        tx.commit()
            .await
            .context("Failed to commit restore transaction")?;
        Ok(inserted)
    }

    async fn insert_loan<'e, E>(executor: E, loan: &Loan) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO loans (id, title, amount_cents, currency, interest_rate_bps, monthly_payment_cents, start_date, next_payment_due, remaining_cents, receipt_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(loan.id.to_string())
        .bind(&loan.title)
        .bind(loan.amount_cents)
        .bind(loan.currency.as_str())
        .bind(loan.interest_rate_bps)
        .bind(loan.monthly_payment_cents)
        .bind(loan.start_date.format(DATE_FORMAT).to_string())
        .bind(loan.next_payment_due.format(DATE_FORMAT).to_string())
        .bind(loan.remaining_cents)
        .bind(&loan.receipt_url)
        .bind(loan.created_at.to_rfc3339())
        .execute(executor)
        .await
        .context("Failed to save loan")?;
        Ok(())
    }

    /// Get a loan by ID.
    pub async fn get_loan(&self, id: LoanId) -> Result<Option<Loan>> {
        let query = format!("SELECT {} FROM loans WHERE id = ?", LOAN_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch loan")?;

        row.as_ref().map(Self::row_to_loan).transpose()
    }

    /// Find loans whose ID starts with the given prefix.
    /// The prefix is matched literally; `%` and `_` are not wildcards.
    pub async fn find_loans_by_id_prefix(&self, prefix: &str) -> Result<Vec<Loan>> {
        let query = format!(
            "SELECT {} FROM loans WHERE id LIKE ? ESCAPE '\\' ORDER BY sequence",
            LOAN_COLUMNS
        );
        let pattern = format!("{}%", escape_like(prefix));
        let rows = sqlx::query(&query)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .context("Failed to search loans by ID")?;

        rows.iter().map(Self::row_to_loan).collect()
    }

    /// List all loans in insertion order.
    pub async fn list_loans(&self) -> Result<Vec<Loan>> {
        let query = format!("SELECT {} FROM loans ORDER BY sequence", LOAN_COLUMNS);
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list loans")?;

        rows.iter().map(Self::row_to_loan).collect()
    }

    /// Delete a loan. Returns true if a row was removed.
    pub async fn delete_loan(&self, id: LoanId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM loans WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete loan")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_loan(row: &sqlx::sqlite::SqliteRow) -> Result<Loan> {
        let id_str: String = row.get("id");
        let currency_str: String = row.get("currency");
        let start_date_str: String = row.get("start_date");
        let next_payment_due_str: String = row.get("next_payment_due");
        let created_at_str: String = row.get("created_at");

        Ok(Loan {
            id: Uuid::parse_str(&id_str).context("Invalid loan ID")?,
            title: row.get("title"),
            amount_cents: row.get("amount_cents"),
            currency: Currency::from_str(&currency_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid currency: {}", currency_str))?,
            interest_rate_bps: row.get("interest_rate_bps"),
            monthly_payment_cents: row.get("monthly_payment_cents"),
            start_date: NaiveDate::parse_from_str(&start_date_str, DATE_FORMAT)
                .context("Invalid start_date")?,
            next_payment_due: NaiveDate::parse_from_str(&next_payment_due_str, DATE_FORMAT)
                .context("Invalid next_payment_due")?,
            remaining_cents: row.get("remaining_cents"),
            receipt_url: row.get("receipt_url"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Profile operations
    // ========================

    /// Store the current profile, replacing any previous one.
    pub async fn save_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profile (slot, name, email, logged_in_at)
            VALUES (1, ?, ?, ?)
            ON CONFLICT(slot) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                logged_in_at = excluded.logged_in_at
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(profile.logged_in_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save profile")?;
        Ok(())
    }

    pub async fn get_profile(&self) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT name, email, logged_in_at FROM profile WHERE slot = 1")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch profile")?;

        match row {
            Some(row) => {
                let logged_in_at_str: String = row.get("logged_in_at");
                Ok(Some(Profile {
                    name: row.get("name"),
                    email: row.get("email"),
                    logged_in_at: DateTime::parse_from_rfc3339(&logged_in_at_str)
                        .context("Invalid logged_in_at timestamp")?
                        .with_timezone(&Utc),
                }))
            }
            None => Ok(None),
        }
    }

    /// Remove the current profile. Returns true if one was stored.
    pub async fn delete_profile(&self) -> Result<bool> {
        let result = sqlx::query("DELETE FROM profile")
            .execute(&self.pool)
            .await
            .context("Failed to delete profile")?;
        Ok(result.rows_affected() > 0)
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
