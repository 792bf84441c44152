//! Ledger domain types.
//!
//! Accounts and journals are created once per company and mutated rarely.
//! Entries are written atomically together with their lines and are never
//! updated afterwards.

use auditia_shared::types::{AccountId, CompanyId, DocumentId, EntryId, EntryLineId, JournalId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::syscohada::class_of;

/// Maximum debit/credit difference an entry may carry.
pub const DEFAULT_ENTRY_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// A chart-of-accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Account code, unique per company.
    pub code: String,
    /// Account name.
    pub name: String,
    /// SYSCOHADA class (0 to 9).
    pub class_code: u8,
    /// Whether the account accepts postings.
    pub is_active: bool,
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Owning company.
    pub company_id: CompanyId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// SYSCOHADA class.
    pub class_code: u8,
}

impl NewAccount {
    /// Creates an account input with the class derived from the code.
    #[must_use]
    pub fn new(company_id: CompanyId, code: impl Into<String>, name: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            company_id,
            class_code: class_of(&code),
            code,
            name: name.into(),
        }
    }
}

/// An accounting journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Journal ID.
    pub id: JournalId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Journal code ("OD", "AC", ...).
    pub code: String,
    /// Journal name.
    pub name: String,
}

/// Origin of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Trial balance import.
    Balance,
    /// Supporting evidence (invoice, statement).
    Evidence,
    /// Anything else.
    Other,
}

impl DocumentKind {
    /// Returns the storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Evidence => "evidence",
            Self::Other => "other",
        }
    }

    /// Parses the storage representation, falling back to `Other`.
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "balance" => Self::Balance,
            "evidence" => Self::Evidence,
            _ => Self::Other,
        }
    }
}

/// Provenance record of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document ID.
    pub id: DocumentId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub name: String,
    /// Original file name.
    pub file_name: String,
    /// Document kind.
    pub kind: DocumentKind,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

/// Input for registering a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub name: String,
    /// Original file name.
    pub file_name: String,
    /// Document kind.
    pub kind: DocumentKind,
}

/// Input for one entry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntryLine {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit amount (non-negative).
    pub debit: Decimal,
    /// Credit amount (non-negative).
    pub credit: Decimal,
    /// Line label.
    pub label: String,
}

/// A fully formed entry ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    /// Target journal.
    pub journal_id: JournalId,
    /// Document that produced the entry.
    pub document_id: Option<DocumentId>,
    /// Accounting date.
    pub date: NaiveDate,
    /// Reference ("BG-2024").
    pub reference: String,
    /// Entry label.
    pub label: String,
    /// Whether the entry has been reviewed.
    pub validated: bool,
    /// Ordered lines.
    pub lines: Vec<NewEntryLine>,
}

impl NewEntry {
    /// Returns (total debit, total credit) over all lines.
    #[must_use]
    pub fn totals(&self) -> (Decimal, Decimal) {
        self.lines.iter().fold((Decimal::ZERO, Decimal::ZERO), |(d, c), line| {
            (d + line.debit, c + line.credit)
        })
    }
}

/// A committed entry line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLine {
    /// Line ID.
    pub id: EntryLineId,
    /// Owning entry.
    pub entry_id: EntryId,
    /// Posted account.
    pub account_id: AccountId,
    /// Code of the posted account.
    pub account_code: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line label.
    pub label: String,
}

impl EntryLine {
    /// The non-zero side of the line (debit if any, else credit).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        if self.debit > Decimal::ZERO {
            self.debit
        } else {
            self.credit
        }
    }
}

/// A committed entry with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry ID.
    pub id: EntryId,
    /// Journal the entry belongs to.
    pub journal_id: JournalId,
    /// Document that produced the entry.
    pub document_id: Option<DocumentId>,
    /// Accounting date.
    pub date: NaiveDate,
    /// Reference.
    pub reference: String,
    /// Entry label.
    pub label: String,
    /// Whether the entry has been reviewed.
    pub validated: bool,
    /// Ordered lines.
    pub lines: Vec<EntryLine>,
}
