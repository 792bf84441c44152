//! Ledger store contract.
//!
//! The store is the only shared mutable resource of the system. Account and
//! journal creation must be idempotent under concurrent imports: a store
//! enforces uniqueness of `(company_id, code)` and answers a duplicate insert
//! by returning the existing row.

use async_trait::async_trait;
use auditia_shared::types::{CompanyId, DocumentId};

use super::error::LedgerError;
use super::snapshot::BalanceSnapshot;
use super::types::{Account, Document, Entry, Journal, NewAccount, NewDocument, NewEntry};

/// Persistence contract required by the reconciler and the report path.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Looks up an account by exact code within a company.
    async fn find_account(
        &self,
        company_id: CompanyId,
        code: &str,
    ) -> Result<Option<Account>, LedgerError>;

    /// Returns the account with this code, creating it if absent.
    ///
    /// The boolean is true when this call created the account.
    async fn get_or_create_account(
        &self,
        account: NewAccount,
    ) -> Result<(Account, bool), LedgerError>;

    /// Lists a company's chart of accounts ordered by code.
    async fn list_accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, LedgerError>;

    /// Returns the journal with this code, creating it if absent.
    async fn get_or_create_journal(
        &self,
        company_id: CompanyId,
        code: &str,
        name: &str,
    ) -> Result<Journal, LedgerError>;

    /// Records the provenance of an uploaded file.
    async fn register_document(&self, document: NewDocument) -> Result<Document, LedgerError>;

    /// Lists a company's registered documents, oldest first.
    async fn list_documents(&self, company_id: CompanyId) -> Result<Vec<Document>, LedgerError>;

    /// Persists an entry and all its lines atomically.
    ///
    /// Implementations re-validate the entry invariant and write nothing when
    /// it fails.
    async fn commit_entry(&self, entry: NewEntry) -> Result<Entry, LedgerError>;

    /// Lists a company's committed entries with their lines, oldest first.
    async fn list_entries(&self, company_id: CompanyId) -> Result<Vec<Entry>, LedgerError>;

    /// Aggregates entry lines per account code, optionally for one document.
    async fn balance_snapshot(
        &self,
        company_id: CompanyId,
        document_id: Option<DocumentId>,
    ) -> Result<BalanceSnapshot, LedgerError>;
}
