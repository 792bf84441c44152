//! Subcommand implementations.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use auditia_core::audit::AuditService;
use auditia_core::import::parse_file;
use auditia_core::ledger::{
    DocumentKind, LedgerStore, NewDocument, Reconciler, ReconcilerConfig,
};
use auditia_core::reports::{
    ReportMapping, TemplateInjector, TrialBalance, missing_sheets,
};
use auditia_core::syscohada::seed_standard_chart;
use auditia_db::{CreateReportTemplate, ReportTemplateRepository, SeaLedgerStore};
use auditia_shared::AppConfig;
use auditia_shared::types::{CompanyId, DocumentId, TemplateId};
use clap::{Args, Subcommand};
use tracing::warn;

/// Arguments of `auditia import`.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Trial balance file (.xlsx, .xls, .ods, .csv, .txt).
    pub file: PathBuf,
    /// Company owning the ledger.
    #[arg(long)]
    pub company: CompanyId,
    /// Document display name (defaults to "Balance {year}").
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments of `auditia report`.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Company owning the ledger.
    #[arg(long)]
    pub company: CompanyId,
    /// Registered template to fill.
    #[arg(long, conflicts_with = "template_file")]
    pub template: Option<TemplateId>,
    /// Template workbook to fill, with `--mapping`.
    #[arg(long, requires = "mapping")]
    pub template_file: Option<PathBuf>,
    /// JSON mapping file for `--template-file`.
    #[arg(long)]
    pub mapping: Option<PathBuf>,
    /// Restrict balances to one imported document.
    #[arg(long)]
    pub document: Option<DocumentId>,
    /// Output workbook (defaults to the exports directory).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments of `auditia trial-balance`.
#[derive(Debug, Args)]
pub struct TrialBalanceArgs {
    /// Company owning the ledger.
    #[arg(long)]
    pub company: CompanyId,
    /// Restrict balances to one imported document.
    #[arg(long)]
    pub document: Option<DocumentId>,
    /// CSV output file (stdout when absent).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments of `auditia audit`.
#[derive(Debug, Clone, Copy, Args)]
pub struct AuditArgs {
    /// Company owning the ledger.
    #[arg(long)]
    pub company: CompanyId,
    /// Restrict coherence checks to one imported document.
    #[arg(long)]
    pub document: Option<DocumentId>,
}

/// `auditia template` subcommands.
#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    /// Register a template workbook and its mapping.
    Add {
        /// Display name.
        #[arg(long)]
        name: String,
        /// ISO country code.
        #[arg(long)]
        country: String,
        /// Fiscal year of the layout.
        #[arg(long)]
        year: i32,
        /// Workbook path, absolute or relative to the templates directory.
        #[arg(long)]
        file: String,
        /// JSON mapping file.
        #[arg(long)]
        mapping: PathBuf,
        /// Optional description.
        #[arg(long)]
        description: Option<String>,
    },
    /// List registered templates.
    List {
        /// Only templates for this country.
        #[arg(long)]
        country: Option<String>,
    },
}

pub async fn import(
    store: &dyn LedgerStore,
    config: &AppConfig,
    args: ImportArgs,
) -> anyhow::Result<()> {
    let parsed = parse_file(&args.file)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let document = NewDocument {
        company_id: args.company,
        name: args
            .name
            .unwrap_or_else(|| format!("Balance {}", parsed.fiscal_year)),
        file_name,
        kind: DocumentKind::Balance,
    };

    let reconciler = Reconciler::with_config(store, ReconcilerConfig::from(&config.ledger));
    let result = reconciler.import_document(&parsed, document).await?;

    if let Some(document_id) = result.document_id {
        println!("Document:          {document_id}");
    }
    println!("Entry:             {}", result.entry_id);
    println!("Fiscal year:       {}", result.fiscal_year);
    println!("Rows booked:       {}", result.entries_count);
    println!("Rows skipped:      {}", result.skipped_rows);
    println!("Accounts created:  {}", result.accounts_created);
    println!("Accounts matched:  {}", result.accounts_matched);
    println!("Total debit:       {}", result.total_debit);
    println!("Total credit:      {}", result.total_credit);
    println!("Gap:               {}", result.gap);
    if let Some(note) = &result.gap_note {
        println!("Note:              {note}");
    }
    for warning in &result.warnings {
        println!("Warning:           {warning}");
    }
    Ok(())
}

fn template_path(config: &AppConfig, file_path: &str) -> PathBuf {
    let path = Path::new(file_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(&config.storage.templates_dir).join(path)
    }
}

pub async fn report(
    store: &SeaLedgerStore,
    config: &AppConfig,
    args: ReportArgs,
) -> anyhow::Result<()> {
    let (template, mapping) = match (args.template, args.template_file) {
        (Some(id), _) => {
            let repo = ReportTemplateRepository::new(store.connection().clone());
            let template = repo.get(id).await?;
            let mapping = template.mapping()?;
            (template_path(config, &template.file_path), mapping)
        }
        (None, Some(path)) => {
            let mapping_path = args
                .mapping
                .context("--mapping is required with --template-file")?;
            let json = fs::read_to_string(&mapping_path)
                .with_context(|| format!("Failed to read {}", mapping_path.display()))?;
            (path, ReportMapping::from_json(&json)?)
        }
        (None, None) => bail!("either --template or --template-file is required"),
    };

    let missing = missing_sheets(&template, &config.reports.required_sheets)?;
    if !missing.is_empty() {
        warn!(template = %template.display(), missing = ?missing, "Template lacks required sheets");
    }

    let snapshot = store.balance_snapshot(args.company, args.document).await?;
    let output = args.output.unwrap_or_else(|| {
        Path::new(&config.storage.exports_dir).join(format!("liasse_{}.xlsx", args.company))
    });

    let report =
        TemplateInjector::generate(&template, &output, &mapping, &snapshot.net_balances())?;
    for line in report.log_lines() {
        println!("{line}");
    }
    println!(
        "{} written, {} skipped, {} errors: {}",
        report.written,
        report.skipped,
        report.errors,
        report.output_path.display()
    );
    Ok(())
}

pub async fn trial_balance(store: &dyn LedgerStore, args: TrialBalanceArgs) -> anyhow::Result<()> {
    let snapshot = store.balance_snapshot(args.company, args.document).await?;
    let names: HashMap<String, String> = store
        .list_accounts(args.company)
        .await?
        .into_iter()
        .map(|a| (a.code, a.name))
        .collect();
    let balance = TrialBalance::from_snapshot(&snapshot, &names);

    match args.output {
        Some(path) => {
            let file = fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            balance.write_csv(file)?;
        }
        None => balance.write_csv(io::stdout().lock())?,
    }

    if !balance.totals.is_balanced {
        warn!(
            debit = %balance.totals.movement_debit,
            credit = %balance.totals.movement_credit,
            "Trial balance is not balanced"
        );
    }
    Ok(())
}

pub async fn audit(
    store: &dyn LedgerStore,
    config: &AppConfig,
    args: AuditArgs,
) -> anyhow::Result<()> {
    let service = AuditService::new(store, &config.ledger);

    let anomalies = service.anomalies(args.company).await?;
    println!("Anomalies: {}", anomalies.len());
    for anomaly in &anomalies {
        println!(
            "  [{:?}] {} {} {}",
            anomaly.severity,
            anomaly.kind.code(),
            anomaly.date,
            anomaly.description
        );
    }

    let report = service.coherence(args.company, args.document).await?;
    println!("Coherence checks:");
    for check in &report.checks {
        println!("  [{:?}] {}: {}", check.status, check.name, check.message);
    }
    if !report.is_coherent() {
        bail!("ledger is not coherent");
    }
    Ok(())
}

pub async fn seed_chart(store: &dyn LedgerStore, company: CompanyId) -> anyhow::Result<()> {
    let created = seed_standard_chart(store, company).await?;
    println!("{created} accounts created");
    Ok(())
}

pub async fn template(store: &SeaLedgerStore, command: TemplateCommand) -> anyhow::Result<()> {
    let repo = ReportTemplateRepository::new(store.connection().clone());
    match command {
        TemplateCommand::Add {
            name,
            country,
            year,
            file,
            mapping,
            description,
        } => {
            let mapping_config = fs::read_to_string(&mapping)
                .with_context(|| format!("Failed to read {}", mapping.display()))?;
            let template = repo
                .create(CreateReportTemplate {
                    name,
                    description,
                    country,
                    year,
                    file_path: file,
                    mapping_config,
                })
                .await?;
            println!("{}", template.id);
        }
        TemplateCommand::List { country } => {
            for template in repo.list(country.as_deref()).await? {
                println!(
                    "{}  {} {}  {}  {}",
                    template.id, template.country, template.year, template.name, template.file_path
                );
            }
        }
    }
    Ok(())
}
