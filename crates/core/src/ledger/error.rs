//! Ledger error types for import, commit and store errors.

use auditia_shared::AppError;
use auditia_shared::types::{AccountId, DocumentId, JournalId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Import Errors ==========
    /// The balance produced no bookable row.
    #[error("Import contains no valid balance rows")]
    EmptyImport,

    /// Fiscal year cannot be turned into a closing date.
    #[error("Invalid fiscal year: {0}")]
    InvalidFiscalYear(i32),

    // ========== Entry Errors ==========
    /// An entry must carry at least one line.
    #[error("Entry must have at least one line")]
    EmptyEntry,

    /// Entry debits and credits differ beyond tolerance.
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },

    /// Entry-line amounts must be non-negative.
    #[error("Entry line amount cannot be negative")]
    NegativeAmount,

    // ========== Reference Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    // ========== Store Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyImport => "EMPTY_IMPORT",
            Self::InvalidFiscalYear(_) => "INVALID_FISCAL_YEAR",
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - entry validation
            Self::InvalidFiscalYear(_)
            | Self::EmptyEntry
            | Self::UnbalancedEntry { .. }
            | Self::NegativeAmount => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::JournalNotFound(_) | Self::DocumentNotFound(_) => 404,

            // 422 Unprocessable - nothing to book
            Self::EmptyImport => 422,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::EmptyImport => Self::BusinessRule(err.to_string()),
            LedgerError::AccountNotFound(_)
            | LedgerError::JournalNotFound(_)
            | LedgerError::DocumentNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Database(msg) => Self::Database(msg),
            LedgerError::Internal(msg) => Self::Internal(msg),
            LedgerError::InvalidFiscalYear(_)
            | LedgerError::EmptyEntry
            | LedgerError::UnbalancedEntry { .. }
            | LedgerError::NegativeAmount => Self::Validation(err.to_string()),
        }
    }
}
