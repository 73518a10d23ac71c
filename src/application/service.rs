use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{LoanForm, Loan, LoanId, LoanLedger, Profile};
use crate::storage::Repository;

use super::{AppError, Dashboard};

/// Shortest ID prefix accepted when looking up a loan.
pub const MIN_ID_PREFIX_LEN: usize = 4;

/// Application service providing high-level operations for the loan book.
/// This is the primary interface for any client (CLI, import/export, etc.).
pub struct LoanService {
    repo: Repository,
}

/// Outcome of importing already-built loan records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreResult {
    pub imported: usize,
    pub skipped: usize,
}

impl LoanService {
    /// Create a new loan service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        debug!(%db_url, "initializing database");
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        debug!(%db_url, "connecting to database");
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Loan operations
    // ========================

    /// Validate the form and record a new loan.
    pub async fn add_loan(&self, form: LoanForm) -> Result<Loan, AppError> {
        let input = form.validate()?;
        let loan = Loan::new(input);

        self.repo.save_loan(&loan).await?;
        info!(id = %loan.id, title = %loan.title, amount_cents = loan.amount_cents, "loan added");
        Ok(loan)
    }

    /// Delete a loan. Returns `None` when there was nothing to delete.
    pub async fn delete_loan(&self, id: LoanId) -> Result<Option<Loan>, AppError> {
        let Some(loan) = self.repo.get_loan(id).await? else {
            debug!(%id, "delete requested for unknown loan");
            return Ok(None);
        };

        self.repo.delete_loan(id).await?;
        info!(%id, title = %loan.title, "loan deleted");
        Ok(Some(loan))
    }

    /// Get a loan by ID.
    pub async fn get_loan(&self, id: LoanId) -> Result<Loan, AppError> {
        self.repo
            .get_loan(id)
            .await?
            .ok_or_else(|| AppError::LoanNotFound(id.to_string()))
    }

    /// Turn user input into a loan ID.
    ///
    /// A full UUID is returned as-is, whether or not it exists. Anything else
    /// is treated as a prefix that must match exactly one stored loan.
    pub async fn resolve_loan_id(&self, input: &str) -> Result<LoanId, AppError> {
        let input = input.trim();
        if let Ok(id) = Uuid::parse_str(input) {
            return Ok(id);
        }
        if input.len() < MIN_ID_PREFIX_LEN {
            return Err(AppError::LoanIdTooShort(input.to_string()));
        }
        // IDs are lowercase hex with dashes, so nothing else can match
        if !input.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(AppError::LoanNotFound(input.to_string()));
        }

        let matches = self
            .repo
            .find_loans_by_id_prefix(&input.to_lowercase())
            .await?;
        match matches.as_slice() {
            [] => Err(AppError::LoanNotFound(input.to_string())),
            [loan] => Ok(loan.id),
            _ => Err(AppError::AmbiguousLoanId {
                prefix: input.to_string(),
                matches: matches.len(),
            }),
        }
    }

    /// List all loans in the order they were added.
    pub async fn list_loans(&self) -> Result<Vec<Loan>, AppError> {
        Ok(self.repo.list_loans().await?)
    }

    /// Load every stored loan into an in-memory ledger.
    pub async fn ledger(&self) -> Result<LoanLedger, AppError> {
        Ok(LoanLedger::from_loans(self.repo.list_loans().await?))
    }

    /// Build the dashboard read model.
    pub async fn dashboard(&self) -> Result<Dashboard, AppError> {
        let ledger = self.ledger().await?;
        let summary = ledger.summary();
        debug!(
            loans = summary.loan_count,
            active = summary.active_count,
            "dashboard computed"
        );

        Ok(Dashboard {
            generated_at: Utc::now(),
            summary,
            loans: ledger.into_loans(),
        })
    }

    /// Store loans that were created elsewhere (e.g. a snapshot).
    ///
    /// Every record is checked first and the batch is written in one
    /// transaction, so an invalid record leaves the book unchanged. Loans
    /// whose ID is already present are skipped.
    pub async fn restore_loans(&self, loans: Vec<Loan>) -> Result<RestoreResult, AppError> {
        for loan in &loans {
            loan.check()
                .map_err(|source| AppError::InvalidLoan { id: loan.id, source })?;
        }

        let imported = self.repo.restore_loans(&loans).await?;
        let result = RestoreResult {
            imported,
            skipped: loans.len() - imported,
        };

        info!(
            imported = result.imported,
            skipped = result.skipped,
            "loans restored"
        );
        Ok(result)
    }

    // ========================
    // Profile operations
    // ========================

    /// Sign in as the given user, replacing any current profile.
    pub async fn login(&self, name: &str, email: &str) -> Result<Profile, AppError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(AppError::InvalidProfile("name cannot be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(AppError::InvalidProfile(format!(
                "'{}' is not an email address",
                email
            )));
        }

        let profile = Profile::new(name, email);
        self.repo.save_profile(&profile).await?;
        info!(name = %profile.name, "logged in");
        Ok(profile)
    }

    /// The signed-in profile.
    pub async fn current_profile(&self) -> Result<Profile, AppError> {
        self.repo.get_profile().await?.ok_or(AppError::NoProfile)
    }

    /// Sign out, returning the profile that was removed.
    pub async fn logout(&self) -> Result<Profile, AppError> {
        let profile = self.current_profile().await?;
        self.repo.delete_profile().await?;
        info!(name = %profile.name, "logged out");
        Ok(profile)
    }
}
