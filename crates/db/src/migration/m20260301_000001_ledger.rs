//! Migration to create the ledger tables.
//!
//! `accounts` and `journals` carry a unique `(company_id, code)` index. The
//! store relies on it to make account and journal creation idempotent under
//! concurrent imports.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Accounts::Code).string_len(32).not_null())
                    .col(ColumnDef::new(Accounts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Accounts::ClassCode).small_integer().not_null())
                    .col(
                        ColumnDef::new(Accounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_company_code")
                    .table(Accounts::Table)
                    .col(Accounts::CompanyId)
                    .col(Accounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Journals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Journals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Journals::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Journals::Code).string_len(16).not_null())
                    .col(ColumnDef::new(Journals::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Journals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journals_company_code")
                    .table(Journals::Table)
                    .col(Journals::CompanyId)
                    .col(Journals::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Documents::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Documents::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Documents::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Documents::FileName).string_len(255).not_null())
                    .col(ColumnDef::new(Documents::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Documents::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Entries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Entries::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Entries::JournalId).uuid().not_null())
                    .col(ColumnDef::new(Entries::DocumentId).uuid().null())
                    .col(ColumnDef::new(Entries::Date).date().not_null())
                    .col(ColumnDef::new(Entries::Reference).string_len(64).not_null())
                    .col(ColumnDef::new(Entries::Label).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Entries::Validated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Entries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entries_journal")
                            .from(Entries::Table, Entries::JournalId)
                            .to(Journals::Table, Journals::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entries_document")
                            .from(Entries::Table, Entries::DocumentId)
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Company-scoped listings and per-document snapshots
        manager
            .create_index(
                Index::create()
                    .name("idx_entries_company_date")
                    .table(Entries::Table)
                    .col(Entries::CompanyId)
                    .col(Entries::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entries_document")
                    .table(Entries::Table)
                    .col(Entries::DocumentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EntryLines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EntryLines::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(EntryLines::EntryId).uuid().not_null())
                    .col(ColumnDef::new(EntryLines::AccountId).uuid().not_null())
                    .col(ColumnDef::new(EntryLines::Position).integer().not_null())
                    .col(ColumnDef::new(EntryLines::Debit).decimal().not_null())
                    .col(ColumnDef::new(EntryLines::Credit).decimal().not_null())
                    .col(ColumnDef::new(EntryLines::Label).string_len(255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entry_lines_entry")
                            .from(EntryLines::Table, EntryLines::EntryId)
                            .to(Entries::Table, Entries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entry_lines_account")
                            .from(EntryLines::Table, EntryLines::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entry_lines_entry")
                    .table(EntryLines::Table)
                    .col(EntryLines::EntryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReportTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportTemplates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReportTemplates::Name).string_len(255).not_null())
                    .col(ColumnDef::new(ReportTemplates::Description).text().null())
                    .col(ColumnDef::new(ReportTemplates::Country).string_len(8).not_null())
                    .col(ColumnDef::new(ReportTemplates::Year).integer().not_null())
                    .col(ColumnDef::new(ReportTemplates::FilePath).text().not_null())
                    .col(ColumnDef::new(ReportTemplates::MappingConfig).text().not_null())
                    .col(
                        ColumnDef::new(ReportTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EntryLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Journals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    CompanyId,
    Code,
    Name,
    ClassCode,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Journals {
    Table,
    Id,
    CompanyId,
    Code,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Documents {
    Table,
    Id,
    CompanyId,
    Name,
    FileName,
    Kind,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Entries {
    Table,
    Id,
    CompanyId,
    JournalId,
    DocumentId,
    Date,
    Reference,
    Label,
    Validated,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EntryLines {
    Table,
    Id,
    EntryId,
    AccountId,
    Position,
    Debit,
    Credit,
    Label,
}

#[derive(DeriveIden)]
enum ReportTemplates {
    Table,
    Id,
    Name,
    Description,
    Country,
    Year,
    FilePath,
    MappingConfig,
    CreatedAt,
}
