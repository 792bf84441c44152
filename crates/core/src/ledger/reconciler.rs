//! Ledger reconciler.
//!
//! Books a parsed trial balance as one balanced entry:
//! 1. Resolves or creates one account per distinct code
//! 2. Accumulates one entry line per balance row
//! 3. Posts any gap beyond tolerance to the suspense account
//! 4. Commits the whole batch atomically in the miscellaneous-operations journal

use std::collections::HashMap;

use auditia_shared::config::LedgerConfig;
use auditia_shared::types::{AccountId, CompanyId, DocumentId, EntryId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::LedgerError;
use super::store::LedgerStore;
use super::types::{NewAccount, NewDocument, NewEntry, NewEntryLine};
use crate::import::{BalanceRow, ParsedBalance};

/// Name given to the suspense account when it is created.
pub const SUSPENSE_ACCOUNT_NAME: &str = "Compte d'attente (écart d'import)";

/// Name given to the import journal when it is created.
pub const IMPORT_JOURNAL_NAME: &str = "Opérations Diverses";

/// Outcome of a balance import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Committed entry.
    pub entry_id: EntryId,
    /// Document the entry was booked from.
    pub document_id: Option<DocumentId>,
    /// Fiscal year of the balance.
    pub fiscal_year: i32,
    /// Balance rows booked (suspense line excluded).
    pub entries_count: usize,
    /// Distinct accounts created by this import.
    pub accounts_created: usize,
    /// Distinct accounts that already existed.
    pub accounts_matched: usize,
    /// Input rows that were not booked.
    pub skipped_rows: usize,
    /// Σ debit over booked rows.
    pub total_debit: Decimal,
    /// Σ credit over booked rows.
    pub total_credit: Decimal,
    /// total_debit − total_credit.
    pub gap: Decimal,
    /// Explanation of the suspense posting, if one was made.
    pub gap_note: Option<String>,
    /// Recoverable issues met during parsing and booking.
    pub warnings: Vec<String>,
}

/// Reconciler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Account absorbing import gaps.
    pub suspense_account_code: String,
    /// Journal receiving the imported entry.
    pub journal_code: String,
    /// Gap above which a suspense line is booked.
    pub gap_tolerance: Decimal,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

impl From<&LedgerConfig> for ReconcilerConfig {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            suspense_account_code: config.suspense_account_code.clone(),
            journal_code: config.default_journal_code.clone(),
            gap_tolerance: config.gap_tolerance,
        }
    }
}

/// Closing date of `fiscal_year`, once at least one row is bookable.
fn closing_date(rows: &[BalanceRow], fiscal_year: i32) -> Result<NaiveDate, LedgerError> {
    if rows.iter().all(BalanceRow::is_zero) {
        return Err(LedgerError::EmptyImport);
    }
    NaiveDate::from_ymd_opt(fiscal_year, 12, 31).ok_or(LedgerError::InvalidFiscalYear(fiscal_year))
}

/// Books normalized balance rows into a ledger store.
pub struct Reconciler<'a> {
    store: &'a dyn LedgerStore,
    config: ReconcilerConfig,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler with the default settings.
    #[must_use]
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self::with_config(store, ReconcilerConfig::default())
    }

    /// Creates a reconciler with explicit settings.
    #[must_use]
    pub fn with_config(store: &'a dyn LedgerStore, config: ReconcilerConfig) -> Self {
        Self { store, config }
    }

    /// Books a parser result, carrying its skipped rows and warnings over.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile`].
    pub async fn import_parsed(
        &self,
        company_id: CompanyId,
        parsed: &ParsedBalance,
        document_id: Option<DocumentId>,
    ) -> Result<ImportResult, LedgerError> {
        let mut result = self
            .reconcile(company_id, &parsed.rows, parsed.fiscal_year, document_id)
            .await?;
        result.skipped_rows += parsed.skipped_rows;
        result.warnings.splice(0..0, parsed.warnings.iter().cloned());
        Ok(result)
    }

    /// Registers `document` and books `parsed` against it.
    ///
    /// The balance is checked first, so a file with nothing to book leaves
    /// no document behind.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EmptyImport` or `LedgerError::InvalidFiscalYear`
    /// before any write, and see [`Reconciler::reconcile`] for the rest.
    pub async fn import_document(
        &self,
        parsed: &ParsedBalance,
        document: NewDocument,
    ) -> Result<ImportResult, LedgerError> {
        closing_date(&parsed.rows, parsed.fiscal_year)?;

        let company_id = document.company_id;
        let document = self.store.register_document(document).await?;
        self.import_parsed(company_id, parsed, Some(document.id)).await
    }

    /// Books normalized rows as one entry dated at the fiscal year's closing.
    ///
    /// Rows with both amounts at zero are skipped. Nothing is written when no
    /// row remains.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::EmptyImport` if no row can be booked, and any
    /// store error raised while resolving accounts or committing.
    pub async fn reconcile(
        &self,
        company_id: CompanyId,
        rows: &[BalanceRow],
        fiscal_year: i32,
        document_id: Option<DocumentId>,
    ) -> Result<ImportResult, LedgerError> {
        let closing_date = closing_date(rows, fiscal_year)?;
        let bookable: Vec<&BalanceRow> = rows.iter().filter(|r| !r.is_zero()).collect();
        let skipped_rows = rows.len() - bookable.len();

        let mut account_cache: HashMap<String, AccountId> = HashMap::new();
        let mut accounts_created = 0;
        let mut accounts_matched = 0;
        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;
        let mut lines = Vec::with_capacity(bookable.len() + 1);

        for row in bookable {
            let account_id = match account_cache.get(&row.account_code) {
                Some(id) => *id,
                None => {
                    let (account, created) = self
                        .store
                        .get_or_create_account(NewAccount::new(
                            company_id,
                            row.account_code.clone(),
                            row.label.clone(),
                        ))
                        .await?;
                    if created {
                        accounts_created += 1;
                    } else {
                        accounts_matched += 1;
                    }
                    account_cache.insert(row.account_code.clone(), account.id);
                    account.id
                }
            };

            total_debit += row.debit;
            total_credit += row.credit;
            lines.push(NewEntryLine {
                account_id,
                debit: row.debit,
                credit: row.credit,
                label: row.label.clone(),
            });
        }
        let entries_count = lines.len();

        let gap = total_debit - total_credit;
        let mut warnings = Vec::new();
        let mut gap_note = None;
        if gap.abs() > self.config.gap_tolerance {
            let suspense_line = self.suspense_line(company_id, gap).await?;
            let side = if gap < Decimal::ZERO { "debit" } else { "credit" };
            let note = format!(
                "Imported balance is off by {gap} (debit {total_debit}, credit {total_credit}). \
                 The difference was booked as a {side} of {} on suspense account {} \
                 and must be investigated before closing.",
                gap.abs(),
                self.config.suspense_account_code,
            );
            warn!(%company_id, fiscal_year, %gap, "unbalanced import booked to suspense account");
            warnings.push(note.clone());
            gap_note = Some(note);
            lines.push(suspense_line);
        }

        let journal = self
            .store
            .get_or_create_journal(company_id, &self.config.journal_code, IMPORT_JOURNAL_NAME)
            .await?;

        let entry = self
            .store
            .commit_entry(NewEntry {
                journal_id: journal.id,
                document_id,
                date: closing_date,
                reference: format!("BG-{fiscal_year}"),
                label: format!("Balance générale {fiscal_year}"),
                validated: false,
                lines,
            })
            .await?;

        info!(
            %company_id,
            fiscal_year,
            entry_id = %entry.id,
            entries_count,
            accounts_created,
            accounts_matched,
            "trial balance imported"
        );

        Ok(ImportResult {
            entry_id: entry.id,
            document_id,
            fiscal_year,
            entries_count,
            accounts_created,
            accounts_matched,
            skipped_rows,
            total_debit,
            total_credit,
            gap,
            gap_note,
            warnings,
        })
    }

    /// Builds the line that brings the entry back to balance.
    async fn suspense_line(
        &self,
        company_id: CompanyId,
        gap: Decimal,
    ) -> Result<NewEntryLine, LedgerError> {
        let (suspense, _) = self
            .store
            .get_or_create_account(NewAccount::new(
                company_id,
                self.config.suspense_account_code.clone(),
                SUSPENSE_ACCOUNT_NAME,
            ))
            .await?;

        // Credit-heavy imports need a debit, debit-heavy ones a credit.
        let (debit, credit) = if gap < Decimal::ZERO {
            (gap.abs(), Decimal::ZERO)
        } else {
            (Decimal::ZERO, gap)
        };

        Ok(NewEntryLine {
            account_id: suspense.id,
            debit,
            credit,
            label: "Écart d'import".to_string(),
        })
    }
}
