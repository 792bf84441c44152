//! Auditia command-line driver.
//!
//! Wires configuration, logging and the database-backed ledger store around
//! the core engine. Results go to stdout, logs to stderr.

mod commands;

use anyhow::Context;
use auditia_db::{SeaLedgerStore, connect_with};
use auditia_shared::AppConfig;
use auditia_shared::types::CompanyId;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{AuditArgs, ImportArgs, ReportArgs, TemplateCommand, TrialBalanceArgs};

#[derive(Debug, Parser)]
#[command(
    name = "auditia",
    version,
    about = "SYSCOHADA trial balance import and statutory reporting"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a trial balance file as one closing entry.
    Import(ImportArgs),
    /// Fill a statement template from the ledger balances.
    Report(ReportArgs),
    /// Export the balance générale as CSV.
    TrialBalance(TrialBalanceArgs),
    /// Run anomaly detection and coherence checks.
    Audit(AuditArgs),
    /// Seed the SYSCOHADA reference chart for a company.
    SeedChart {
        /// Company to seed.
        #[arg(long)]
        company: CompanyId,
    },
    /// Manage report templates.
    #[command(subcommand)]
    Template(TemplateCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auditia=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let store = SeaLedgerStore::with_entry_tolerance(db, config.ledger.entry_tolerance);

    match cli.command {
        Command::Import(args) => commands::import(&store, &config, args).await,
        Command::Report(args) => commands::report(&store, &config, args).await,
        Command::TrialBalance(args) => commands::trial_balance(&store, args).await,
        Command::Audit(args) => commands::audit(&store, &config, args).await,
        Command::SeedChart { company } => commands::seed_chart(&store, company).await,
        Command::Template(command) => commands::template(&store, command).await,
    }
}
