use std::fmt::{self, Write as _};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::application::{Dashboard, LoanService};
use crate::domain::{Currency, Loan, LoanForm, format_amount, format_rate};

/// Loanbook - Personal Loan Tracker
#[derive(Parser)]
#[command(name = "loanbook")]
#[command(about = "A local-first tracker for personal loans")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "LOANBOOK_DB", default_value = "loanbook.db", global = true)]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Add a loan
    Add {
        /// Loan title
        title: String,

        /// Principal amount, commas allowed (e.g., "1,000,000" or "2500.50")
        #[arg(short, long)]
        amount: String,

        /// Currency: THB, USD, EUR
        #[arg(short, long, default_value = "THB")]
        currency: String,

        /// Interest rate in percent (e.g., "5.25")
        #[arg(short, long)]
        rate: String,

        /// Monthly payment amount
        #[arg(short, long)]
        payment: String,

        /// Start month (1-12)
        #[arg(long)]
        month: String,

        /// Start day of month (1-31)
        #[arg(long)]
        day: String,

        /// Start year (YYYY)
        #[arg(long)]
        year: String,

        /// Path or URL of a receipt image
        #[arg(long)]
        receipt: Option<String>,
    },

    /// Delete a loan
    Delete {
        /// Loan ID (or a unique prefix of it)
        id: String,
    },

    /// List all loans
    List,

    /// Show totals and all loans
    Dashboard {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show detailed loan information
    Show {
        /// Loan ID (or a unique prefix of it)
        id: String,
    },

    /// Profile commands
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Export loans to CSV or JSON
    Export {
        /// What to export: loans (CSV), full (JSON)
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import loans from CSV or JSON
    Import {
        /// What to import: loans (CSV), full (JSON)
        import_type: String,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the signed-in user
    Show,

    /// Sign in
    Login {
        /// Display name
        name: String,

        /// Email address
        email: String,
    },

    /// Sign out
    Logout,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LoanService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Add {
                title,
                amount,
                currency,
                rate,
                payment,
                month,
                day,
                year,
                receipt,
            } => {
                let service = LoanService::connect(&self.database).await?;

                if let Some(path) = receipt.as_deref() {
                    if !path.contains("://") && !std::path::Path::new(path).exists() {
                        warn!(%path, "receipt file does not exist, storing the reference anyway");
                    }
                }

                let form = LoanForm {
                    title,
                    amount,
                    currency,
                    interest_rate: rate,
                    monthly_payment: payment,
                    month,
                    day,
                    year,
                    receipt,
                };

                let loan = service.add_loan(form).await?;
                println!(
                    "Added loan: {} {} {} ({})",
                    loan.title,
                    loan.currency,
                    format_amount(loan.amount_cents),
                    loan.id
                );
            }

            Commands::Delete { id } => {
                let service = LoanService::connect(&self.database).await?;
                let loan_id = service.resolve_loan_id(&id).await?;

                match service.delete_loan(loan_id).await? {
                    Some(loan) => println!("Deleted loan: {} ({})", loan.title, loan.id),
                    None => println!("No loan with ID {}, nothing deleted.", loan_id),
                }
            }

            Commands::List => {
                let service = LoanService::connect(&self.database).await?;
                let loans = service.list_loans().await?;
                if loans.is_empty() {
                    println!("No loans yet.");
                } else {
                    print!("{}", render_loan_table(&loans));
                }
            }

            Commands::Dashboard { format } => {
                let service = LoanService::connect(&self.database).await?;
                run_dashboard_command(&service, &format).await?;
            }

            Commands::Show { id } => {
                let service = LoanService::connect(&self.database).await?;
                let loan_id = service.resolve_loan_id(&id).await?;
                let loan = service.get_loan(loan_id).await?;
                print_loan_details(&loan);
            }

            Commands::Profile(profile_cmd) => {
                let service = LoanService::connect(&self.database).await?;
                run_profile_command(&service, profile_cmd).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = LoanService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }

            Commands::Import {
                import_type,
                input,
                dry_run,
            } => {
                let service = LoanService::connect(&self.database).await?;
                run_import_command(&service, &import_type, input.as_deref(), dry_run).await?;
            }
        }

        Ok(())
    }
}

async fn run_dashboard_command(service: &LoanService, format: &str) -> Result<()> {
    let dashboard = service.dashboard().await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        "table" => print!("{}", render_dashboard(&dashboard)),
        other => anyhow::bail!("Unknown format '{}'. Use: table, json", other),
    }
    Ok(())
}

async fn run_profile_command(service: &LoanService, cmd: ProfileCommands) -> Result<()> {
    match cmd {
        ProfileCommands::Show => {
            let profile = service.current_profile().await?;
            if let Some(initial) = profile.initial() {
                println!("[{}]", initial.to_uppercase());
            }
            println!("{}", profile.name);
            println!("{}", profile.email);
        }
        ProfileCommands::Login { name, email } => {
            let profile = service.login(&name, &email).await?;
            println!("Logged in as {} <{}>", profile.name, profile.email);
        }
        ProfileCommands::Logout => {
            let profile = service.logout().await?;
            println!("Logged out {}", profile.name);
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &LoanService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file '{}'", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "loans" => {
            let count = exporter.export_loans_csv(writer).await?;
            if let Some(path) = output {
                eprintln!("Exported {} loans to {}", count, path);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if let Some(path) = output {
                eprintln!("Exported {} loans to {}", snapshot.loans.len(), path);
            }
        }
        other => anyhow::bail!("Unknown export type '{}'. Use: loans, full", other),
    }
    Ok(())
}

async fn run_import_command(
    service: &LoanService,
    import_type: &str,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(service);
    let options = ImportOptions { dry_run };

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file '{}'", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = match import_type {
        "loans" => importer.import_loans_csv(reader, options).await?,
        "full" => importer.import_full_json(reader, options).await?,
        other => anyhow::bail!("Unknown import type '{}'. Use: loans, full", other),
    };

    let verb = if dry_run { "Would import" } else { "Imported" };
    println!("{} {} loans ({} skipped)", verb, result.imported, result.skipped);

    if !result.errors.is_empty() {
        println!("{} errors:", result.errors.len());
        for error in &result.errors {
            match &error.field {
                Some(field) => println!("  line {}: {}: {}", error.line, field, error.error),
                None => println!("  line {}: {}", error.line, error.error),
            }
        }
    }
    Ok(())
}

/// Text form of the dashboard: totals, active count, then the loan table.
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    // Writing into a String never fails
    let _ = write_dashboard(&mut out, dashboard);
    out
}

fn write_dashboard(out: &mut String, dashboard: &Dashboard) -> fmt::Result {
    let summary = &dashboard.summary;
    writeln!(out, "Your Loans")?;
    writeln!(out)?;

    let mut currencies = summary.by_currency.keys();
    match (currencies.next(), currencies.next()) {
        (None, _) => writeln!(
            out,
            "  Total remaining:  {} {}",
            Currency::default(),
            format_amount(0)
        )?,
        (Some(currency), None) => writeln!(
            out,
            "  Total remaining:  {} {}",
            currency,
            format_amount(summary.total_remaining)
        )?,
        // A sum across currencies has no single unit, show each one
        (Some(_), Some(_)) => {
            writeln!(out, "  Total remaining:")?;
            for (currency, remaining) in &summary.by_currency {
                writeln!(out, "    {:<4} {:>20}", currency, format_amount(*remaining))?;
            }
        }
    }
    writeln!(out, "  Active loans:     {}", summary.active_count)?;
    writeln!(out)?;

    if dashboard.is_empty() {
        writeln!(out, "No loans yet")?;
        writeln!(out, "Add your first loan to start tracking")?;
    } else {
        write_loan_table(out, &dashboard.loans)?;
    }
    Ok(())
}

/// Loans as fixed-width columns, one row per loan.
pub fn render_loan_table(loans: &[Loan]) -> String {
    let mut out = String::new();
    let _ = write_loan_table(&mut out, loans);
    out
}

fn write_loan_table(out: &mut String, loans: &[Loan]) -> fmt::Result {
    writeln!(
        out,
        "{:<10} {:<20} {:<4} {:>16} {:>16} {:>8} {:<10}",
        "ID", "TITLE", "CUR", "AMOUNT", "REMAINING", "RATE", "START"
    )?;
    writeln!(out, "{}", "-".repeat(90))?;
    for loan in loans {
        let id = loan.id.to_string();
        writeln!(
            out,
            "{:<10} {:<20} {:<4} {:>16} {:>16} {:>8} {:<10}",
            &id[..8],
            truncate(&loan.title, 20),
            loan.currency,
            format_amount(loan.amount_cents),
            format_amount(loan.remaining_cents),
            format_rate(loan.interest_rate_bps),
            loan.start_date.format("%Y-%m-%d").to_string(),
        )?;
    }
    Ok(())
}

fn print_loan_details(loan: &Loan) {
    println!("Loan: {}", loan.title);
    println!("  ID:               {}", loan.id);
    println!(
        "  Amount:           {} {}",
        loan.currency,
        format_amount(loan.amount_cents)
    );
    println!(
        "  Remaining:        {} {}",
        loan.currency,
        format_amount(loan.remaining_cents)
    );
    println!("  Interest rate:    {}", format_rate(loan.interest_rate_bps));
    println!(
        "  Monthly payment:  {} {}",
        loan.currency,
        format_amount(loan.monthly_payment_cents)
    );
    println!("  Start date:       {}", loan.start_date.format("%Y-%m-%d"));
    println!(
        "  Next payment due: {}",
        loan.next_payment_due.format("%Y-%m-%d")
    );
    if let Some(receipt) = &loan.receipt_url {
        println!("  Receipt:          {}", receipt);
    }
    println!(
        "  Status:           {}",
        if loan.is_active() { "active" } else { "paid off" }
    );
    println!(
        "  Created:          {}",
        loan.created_at.format("%Y-%m-%d %H:%M:%S")
    );
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
