//! `SeaORM` implementation of the ledger store.
//!
//! Uniqueness of `(company_id, code)` is enforced by the schema. Account and
//! journal creation insert first and fall back to the existing row on a
//! unique-constraint violation, so concurrent imports converge on one row.

use std::collections::HashMap;

use async_trait::async_trait;
use auditia_core::ledger::types::DEFAULT_ENTRY_TOLERANCE;
use auditia_core::ledger::{
    Account, BalanceSnapshot, Document, DocumentKind, Entry, EntryLine, Journal, LedgerError,
    LedgerStore, NewAccount, NewDocument, NewEntry, validate_entry,
};
use auditia_core::syscohada::UNKNOWN_CLASS;
use auditia_shared::types::{
    AccountId, CompanyId, DocumentId, EntryId, EntryLineId, JournalId,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{accounts, documents, entries, entry_lines, journals};

/// Entry lines written per INSERT statement.
const LINE_BATCH_SIZE: usize = 500;

fn db_error(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

fn account_from_model(model: accounts::Model) -> Account {
    Account {
        id: model.id.into(),
        company_id: model.company_id.into(),
        code: model.code,
        name: model.name,
        class_code: u8::try_from(model.class_code).unwrap_or(UNKNOWN_CLASS),
        is_active: model.is_active,
    }
}

fn journal_from_model(model: journals::Model) -> Journal {
    Journal {
        id: model.id.into(),
        company_id: model.company_id.into(),
        code: model.code,
        name: model.name,
    }
}

fn document_from_model(model: documents::Model) -> Document {
    Document {
        id: model.id.into(),
        company_id: model.company_id.into(),
        name: model.name,
        file_name: model.file_name,
        kind: DocumentKind::from_str_lossy(&model.kind),
        uploaded_at: model.uploaded_at.with_timezone(&Utc),
    }
}

/// Ledger store backed by a relational database.
#[derive(Debug, Clone)]
pub struct SeaLedgerStore {
    db: DatabaseConnection,
    entry_tolerance: Decimal,
}

impl SeaLedgerStore {
    /// Creates a store with the default entry tolerance.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_entry_tolerance(db, DEFAULT_ENTRY_TOLERANCE)
    }

    /// Creates a store re-validating entries with a custom tolerance.
    #[must_use]
    pub fn with_entry_tolerance(db: DatabaseConnection, entry_tolerance: Decimal) -> Self {
        Self {
            db,
            entry_tolerance,
        }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn find_account_model<C: ConnectionTrait>(
        conn: &C,
        company_id: CompanyId,
        code: &str,
    ) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .filter(accounts::Column::Code.eq(code))
            .one(conn)
            .await
    }

    async fn find_journal_model<C: ConnectionTrait>(
        conn: &C,
        company_id: CompanyId,
        code: &str,
    ) -> Result<Option<journals::Model>, DbErr> {
        journals::Entity::find()
            .filter(journals::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journals::Column::Code.eq(code))
            .one(conn)
            .await
    }

    /// Maps account IDs of a company to their codes.
    async fn account_codes<C: ConnectionTrait>(
        conn: &C,
        company_id: Uuid,
    ) -> Result<HashMap<Uuid, String>, DbErr> {
        let rows: Vec<(Uuid, String)> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Id)
            .column(accounts::Column::Code)
            .filter(accounts::Column::CompanyId.eq(company_id))
            .into_tuple()
            .all(conn)
            .await?;
        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl LedgerStore for SeaLedgerStore {
    async fn find_account(
        &self,
        company_id: CompanyId,
        code: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let model = Self::find_account_model(&self.db, company_id, code)
            .await
            .map_err(db_error)?;
        Ok(model.map(account_from_model))
    }

    async fn get_or_create_account(
        &self,
        account: NewAccount,
    ) -> Result<(Account, bool), LedgerError> {
        if let Some(existing) = Self::find_account_model(&self.db, account.company_id, &account.code)
            .await
            .map_err(db_error)?
        {
            return Ok((account_from_model(existing), false));
        }

        let model = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            company_id: Set(account.company_id.into_inner()),
            code: Set(account.code.clone()),
            name: Set(account.name),
            class_code: Set(i16::from(account.class_code)),
            is_active: Set(true),
            created_at: Set(now()),
        };

        match model.insert(&self.db).await {
            Ok(created) => {
                debug!(code = %created.code, "Account created");
                Ok((account_from_model(created), true))
            }
            Err(err) if is_unique_violation(&err) => {
                // Lost the race to a concurrent import
                let existing =
                    Self::find_account_model(&self.db, account.company_id, &account.code)
                        .await
                        .map_err(db_error)?
                        .ok_or_else(|| db_error(err))?;
                Ok((account_from_model(existing), false))
            }
            Err(err) => Err(db_error(err)),
        }
    }

    async fn list_accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, LedgerError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(account_from_model).collect())
    }

    async fn get_or_create_journal(
        &self,
        company_id: CompanyId,
        code: &str,
        name: &str,
    ) -> Result<Journal, LedgerError> {
        if let Some(existing) = Self::find_journal_model(&self.db, company_id, code)
            .await
            .map_err(db_error)?
        {
            return Ok(journal_from_model(existing));
        }

        let model = journals::ActiveModel {
            id: Set(JournalId::new().into_inner()),
            company_id: Set(company_id.into_inner()),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            created_at: Set(now()),
        };

        match model.insert(&self.db).await {
            Ok(created) => Ok(journal_from_model(created)),
            Err(err) if is_unique_violation(&err) => {
                let existing = Self::find_journal_model(&self.db, company_id, code)
                    .await
                    .map_err(db_error)?
                    .ok_or_else(|| db_error(err))?;
                Ok(journal_from_model(existing))
            }
            Err(err) => Err(db_error(err)),
        }
    }

    async fn register_document(&self, document: NewDocument) -> Result<Document, LedgerError> {
        let model = documents::ActiveModel {
            id: Set(DocumentId::new().into_inner()),
            company_id: Set(document.company_id.into_inner()),
            name: Set(document.name),
            file_name: Set(document.file_name),
            kind: Set(document.kind.as_str().to_string()),
            uploaded_at: Set(now()),
        };
        let created = model.insert(&self.db).await.map_err(db_error)?;
        Ok(document_from_model(created))
    }

    async fn list_documents(&self, company_id: CompanyId) -> Result<Vec<Document>, LedgerError> {
        let models = documents::Entity::find()
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(documents::Column::UploadedAt)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(document_from_model).collect())
    }

    async fn commit_entry(&self, entry: NewEntry) -> Result<Entry, LedgerError> {
        validate_entry(&entry, self.entry_tolerance)?;

        let NewEntry {
            journal_id,
            document_id,
            date,
            reference,
            label,
            validated,
            lines: new_lines,
        } = entry;

        let txn = self.db.begin().await.map_err(db_error)?;

        let journal = journals::Entity::find_by_id(journal_id.into_inner())
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::JournalNotFound(journal_id))?;
        let company_id = journal.company_id;

        if let Some(document_id) = document_id {
            let document = documents::Entity::find_by_id(document_id.into_inner())
                .one(&txn)
                .await
                .map_err(db_error)?;
            if document.is_none_or(|d| d.company_id != company_id) {
                return Err(LedgerError::DocumentNotFound(document_id));
            }
        }

        let codes = Self::account_codes(&txn, company_id)
            .await
            .map_err(db_error)?;

        let entry_id = EntryId::new();
        let mut lines = Vec::with_capacity(new_lines.len());
        let mut line_models = Vec::with_capacity(new_lines.len());
        for (position, line) in new_lines.into_iter().enumerate() {
            let account_code = codes
                .get(&line.account_id.into_inner())
                .cloned()
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            let position = i32::try_from(position)
                .map_err(|_| LedgerError::Internal("entry has too many lines".to_string()))?;
            let line_id = EntryLineId::new();

            line_models.push(entry_lines::ActiveModel {
                id: Set(line_id.into_inner()),
                entry_id: Set(entry_id.into_inner()),
                account_id: Set(line.account_id.into_inner()),
                position: Set(position),
                debit: Set(line.debit),
                credit: Set(line.credit),
                label: Set(line.label.clone()),
            });
            lines.push(EntryLine {
                id: line_id,
                entry_id,
                account_id: line.account_id,
                account_code,
                debit: line.debit,
                credit: line.credit,
                label: line.label,
            });
        }

        entries::ActiveModel {
            id: Set(entry_id.into_inner()),
            company_id: Set(company_id),
            journal_id: Set(journal_id.into_inner()),
            document_id: Set(document_id.map(DocumentId::into_inner)),
            date: Set(date),
            reference: Set(reference.clone()),
            label: Set(label.clone()),
            validated: Set(validated),
            created_at: Set(now()),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;

        for batch in line_models.chunks(LINE_BATCH_SIZE) {
            entry_lines::Entity::insert_many(batch.iter().cloned())
                .exec_without_returning(&txn)
                .await
                .map_err(db_error)?;
        }

        txn.commit().await.map_err(db_error)?;

        info!(
            entry_id = %entry_id,
            reference = %reference,
            lines = lines.len(),
            "Entry committed"
        );

        Ok(Entry {
            id: entry_id,
            journal_id,
            document_id,
            date,
            reference,
            label,
            validated,
            lines,
        })
    }

    async fn list_entries(&self, company_id: CompanyId) -> Result<Vec<Entry>, LedgerError> {
        let company = company_id.into_inner();
        let entry_models = entries::Entity::find()
            .filter(entries::Column::CompanyId.eq(company))
            .order_by_asc(entries::Column::Date)
            .order_by_asc(entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        if entry_models.is_empty() {
            return Ok(Vec::new());
        }

        let line_models = entry_lines::Entity::find()
            .inner_join(entries::Entity)
            .filter(entries::Column::CompanyId.eq(company))
            .order_by_asc(entry_lines::Column::EntryId)
            .order_by_asc(entry_lines::Column::Position)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        let codes = Self::account_codes(&self.db, company)
            .await
            .map_err(db_error)?;

        let mut lines_by_entry: HashMap<Uuid, Vec<EntryLine>> = HashMap::new();
        for line in line_models {
            let account_code = codes.get(&line.account_id).cloned().unwrap_or_default();
            lines_by_entry
                .entry(line.entry_id)
                .or_default()
                .push(EntryLine {
                    id: line.id.into(),
                    entry_id: line.entry_id.into(),
                    account_id: line.account_id.into(),
                    account_code,
                    debit: line.debit,
                    credit: line.credit,
                    label: line.label,
                });
        }

        Ok(entry_models
            .into_iter()
            .map(|model| Entry {
                id: model.id.into(),
                journal_id: model.journal_id.into(),
                document_id: model.document_id.map(DocumentId::from),
                date: model.date,
                reference: model.reference,
                label: model.label,
                validated: model.validated,
                lines: lines_by_entry.remove(&model.id).unwrap_or_default(),
            })
            .collect())
    }

    async fn balance_snapshot(
        &self,
        company_id: CompanyId,
        document_id: Option<DocumentId>,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let mut query = entry_lines::Entity::find()
            .select_only()
            .column(accounts::Column::Code)
            .column_as(
                Expr::col((entry_lines::Entity, entry_lines::Column::Debit)).sum(),
                "debit",
            )
            .column_as(
                Expr::col((entry_lines::Entity, entry_lines::Column::Credit)).sum(),
                "credit",
            )
            .inner_join(entries::Entity)
            .inner_join(accounts::Entity)
            .filter(entries::Column::CompanyId.eq(company_id.into_inner()))
            .group_by(accounts::Column::Code);
        if let Some(document_id) = document_id {
            query = query.filter(entries::Column::DocumentId.eq(document_id.into_inner()));
        }

        let rows: Vec<(String, Decimal, Decimal)> =
            query.into_tuple().all(&self.db).await.map_err(db_error)?;
        Ok(rows.into_iter().collect())
    }
}
