//! In-process ledger store.
//!
//! Used by tests and by single-process tooling. State lives behind one mutex,
//! so every operation is atomic with respect to the others.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use auditia_shared::types::{
    AccountId, CompanyId, DocumentId, EntryId, EntryLineId, JournalId,
};
use chrono::Utc;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::snapshot::BalanceSnapshot;
use super::store::LedgerStore;
use super::types::{
    Account, DEFAULT_ENTRY_TOLERANCE, Document, Entry, EntryLine, Journal, NewAccount,
    NewDocument, NewEntry,
};
use super::validation::validate_entry;

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Account>,
    journals: Vec<Journal>,
    documents: Vec<Document>,
    entries: Vec<Entry>,
}

impl State {
    fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn journal(&self, id: JournalId) -> Option<&Journal> {
        self.journals.iter().find(|j| j.id == id)
    }

    fn journal_company(&self, id: JournalId) -> Option<CompanyId> {
        self.journal(id).map(|j| j.company_id)
    }
}

/// Ledger store holding everything in memory.
#[derive(Debug)]
pub struct MemoryLedgerStore {
    state: Mutex<State>,
    entry_tolerance: Decimal,
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedgerStore {
    /// Creates an empty store with the default entry tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self::with_entry_tolerance(DEFAULT_ENTRY_TOLERANCE)
    }

    /// Creates an empty store with a custom entry tolerance.
    #[must_use]
    pub fn with_entry_tolerance(entry_tolerance: Decimal) -> Self {
        Self {
            state: Mutex::new(State::default()),
            entry_tolerance,
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Internal("ledger store lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn find_account(
        &self,
        company_id: CompanyId,
        code: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let state = self.state()?;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.company_id == company_id && a.code == code)
            .cloned())
    }

    async fn get_or_create_account(
        &self,
        account: NewAccount,
    ) -> Result<(Account, bool), LedgerError> {
        let mut state = self.state()?;
        if let Some(existing) = state
            .accounts
            .iter()
            .find(|a| a.company_id == account.company_id && a.code == account.code)
        {
            return Ok((existing.clone(), false));
        }

        let created = Account {
            id: AccountId::new(),
            company_id: account.company_id,
            code: account.code,
            name: account.name,
            class_code: account.class_code,
            is_active: true,
        };
        state.accounts.push(created.clone());
        Ok((created, true))
    }

    async fn list_accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, LedgerError> {
        let state = self.state()?;
        let mut accounts: Vec<Account> = state
            .accounts
            .iter()
            .filter(|a| a.company_id == company_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn get_or_create_journal(
        &self,
        company_id: CompanyId,
        code: &str,
        name: &str,
    ) -> Result<Journal, LedgerError> {
        let mut state = self.state()?;
        if let Some(existing) = state
            .journals
            .iter()
            .find(|j| j.company_id == company_id && j.code == code)
        {
            return Ok(existing.clone());
        }

        let journal = Journal {
            id: JournalId::new(),
            company_id,
            code: code.to_string(),
            name: name.to_string(),
        };
        state.journals.push(journal.clone());
        Ok(journal)
    }

    async fn register_document(&self, document: NewDocument) -> Result<Document, LedgerError> {
        let mut state = self.state()?;
        let document = Document {
            id: DocumentId::new(),
            company_id: document.company_id,
            name: document.name,
            file_name: document.file_name,
            kind: document.kind,
            uploaded_at: Utc::now(),
        };
        state.documents.push(document.clone());
        Ok(document)
    }

    async fn list_documents(&self, company_id: CompanyId) -> Result<Vec<Document>, LedgerError> {
        let state = self.state()?;
        Ok(state
            .documents
            .iter()
            .filter(|d| d.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn commit_entry(&self, entry: NewEntry) -> Result<Entry, LedgerError> {
        validate_entry(&entry, self.entry_tolerance)?;

        let mut state = self.state()?;
        let company_id = state
            .journal_company(entry.journal_id)
            .ok_or(LedgerError::JournalNotFound(entry.journal_id))?;

        if let Some(document_id) = entry.document_id {
            if !state
                .documents
                .iter()
                .any(|d| d.id == document_id && d.company_id == company_id)
            {
                return Err(LedgerError::DocumentNotFound(document_id));
            }
        }

        // Resolve every line before touching state so a bad line writes nothing.
        let entry_id = EntryId::new();
        let mut lines = Vec::with_capacity(entry.lines.len());
        for line in entry.lines {
            let account = state
                .account(line.account_id)
                .filter(|a| a.company_id == company_id)
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            lines.push(EntryLine {
                id: EntryLineId::new(),
                entry_id,
                account_id: account.id,
                account_code: account.code.clone(),
                debit: line.debit,
                credit: line.credit,
                label: line.label,
            });
        }

        let committed = Entry {
            id: entry_id,
            journal_id: entry.journal_id,
            document_id: entry.document_id,
            date: entry.date,
            reference: entry.reference,
            label: entry.label,
            validated: entry.validated,
            lines,
        };
        state.entries.push(committed.clone());
        Ok(committed)
    }

    async fn list_entries(&self, company_id: CompanyId) -> Result<Vec<Entry>, LedgerError> {
        let state = self.state()?;
        Ok(state
            .entries
            .iter()
            .filter(|e| state.journal_company(e.journal_id) == Some(company_id))
            .cloned()
            .collect())
    }

    async fn balance_snapshot(
        &self,
        company_id: CompanyId,
        document_id: Option<DocumentId>,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let state = self.state()?;
        let snapshot = state
            .entries
            .iter()
            .filter(|e| state.journal_company(e.journal_id) == Some(company_id))
            .filter(|e| document_id.is_none() || e.document_id == document_id)
            .flat_map(|e| e.lines.iter())
            .map(|line| (line.account_code.as_str(), line.debit, line.credit))
            .collect();
        Ok(snapshot)
    }
}
