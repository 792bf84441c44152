//! Integration tests for the database-backed ledger store.

mod common;

use auditia_core::import::{BalanceParser, BalanceRow, RawTable};
use auditia_core::ledger::{
    DocumentKind, LedgerError, LedgerStore, NewAccount, NewDocument, NewEntry, NewEntryLine,
    Reconciler,
};
use auditia_core::syscohada::seed_standard_chart;
use auditia_db::SeaLedgerStore;
use auditia_shared::types::{AccountId, CompanyId, JournalId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::setup_db;

async fn setup_store() -> SeaLedgerStore {
    SeaLedgerStore::new(setup_db().await)
}

fn rows(data: &[(&str, Decimal, Decimal)]) -> Vec<BalanceRow> {
    data.iter()
        .map(|(code, d, c)| BalanceRow::new(*code, format!("Compte {code}"), *d, *c))
        .collect()
}

fn line(account_id: AccountId, debit: Decimal, credit: Decimal) -> NewEntryLine {
    NewEntryLine {
        account_id,
        debit,
        credit,
        label: String::new(),
    }
}

fn entry(journal_id: JournalId, lines: Vec<NewEntryLine>) -> NewEntry {
    NewEntry {
        journal_id,
        document_id: None,
        date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        reference: "OD-001".to_string(),
        label: "Écriture de test".to_string(),
        validated: false,
        lines,
    }
}

#[tokio::test]
async fn test_get_or_create_account_is_idempotent() {
    let store = setup_store().await;
    let company = CompanyId::new();

    let (first, created) = store
        .get_or_create_account(NewAccount::new(company, "521", "Banque"))
        .await
        .unwrap();
    assert!(created);
    assert_eq!(first.class_code, 5);
    assert!(first.is_active);

    let (second, created) = store
        .get_or_create_account(NewAccount::new(company, "521", "Autre libellé"))
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.name, "Banque");

    let found = store.find_account(company, "521").await.unwrap();
    assert_eq!(found.map(|a| a.id), Some(first.id));
    assert!(store.find_account(CompanyId::new(), "521").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_account_creation_converges() {
    let store = setup_store().await;
    let company = CompanyId::new();

    let (a, b) = tokio::join!(
        store.get_or_create_account(NewAccount::new(company, "401", "Fournisseurs")),
        store.get_or_create_account(NewAccount::new(company, "401", "Fournisseurs")),
    );
    let (a, a_created) = a.unwrap();
    let (b, b_created) = b.unwrap();

    assert_eq!(a.id, b.id);
    assert!(a_created ^ b_created);
    assert_eq!(store.list_accounts(company).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_accounts_are_listed_by_code() {
    let store = setup_store().await;
    let company = CompanyId::new();

    for code in ["601", "101", "4011"] {
        store
            .get_or_create_account(NewAccount::new(company, code, format!("Compte {code}")))
            .await
            .unwrap();
    }

    let codes: Vec<String> = store
        .list_accounts(company)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.code)
        .collect();
    assert_eq!(codes, vec!["101", "4011", "601"]);
}

#[tokio::test]
async fn test_get_or_create_journal_is_idempotent() {
    let store = setup_store().await;
    let company = CompanyId::new();

    let first = store
        .get_or_create_journal(company, "OD", "Opérations Diverses")
        .await
        .unwrap();
    let second = store
        .get_or_create_journal(company, "OD", "Opérations Diverses")
        .await
        .unwrap();
    let other = store
        .get_or_create_journal(CompanyId::new(), "OD", "Opérations Diverses")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_ne!(first.id, other.id);
}

#[tokio::test]
async fn test_commit_entry_round_trips_lines() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let journal = store
        .get_or_create_journal(company, "OD", "Opérations Diverses")
        .await
        .unwrap();
    let (bank, _) = store
        .get_or_create_account(NewAccount::new(company, "521", "Banque"))
        .await
        .unwrap();
    let (capital, _) = store
        .get_or_create_account(NewAccount::new(company, "101", "Capital social"))
        .await
        .unwrap();

    let committed = store
        .commit_entry(entry(
            journal.id,
            vec![
                line(bank.id, dec!(1500.5), Decimal::ZERO),
                line(capital.id, Decimal::ZERO, dec!(1500.5)),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(committed.lines.len(), 2);
    assert_eq!(committed.lines[0].account_code, "521");

    let entries = store.list_entries(company).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, committed.id);
    assert_eq!(entries[0].reference, "OD-001");
    let codes: Vec<&str> = entries[0]
        .lines
        .iter()
        .map(|l| l.account_code.as_str())
        .collect();
    assert_eq!(codes, vec!["521", "101"]);
    assert_eq!(entries[0].lines[0].debit, dec!(1500.5));
    assert_eq!(entries[0].lines[1].credit, dec!(1500.5));
}

#[tokio::test]
async fn test_unbalanced_entry_writes_nothing() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let journal = store
        .get_or_create_journal(company, "OD", "Opérations Diverses")
        .await
        .unwrap();
    let (bank, _) = store
        .get_or_create_account(NewAccount::new(company, "521", "Banque"))
        .await
        .unwrap();
    let (capital, _) = store
        .get_or_create_account(NewAccount::new(company, "101", "Capital social"))
        .await
        .unwrap();

    let err = store
        .commit_entry(entry(
            journal.id,
            vec![
                line(bank.id, dec!(100), Decimal::ZERO),
                line(capital.id, Decimal::ZERO, dec!(90)),
            ],
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::UnbalancedEntry { .. }));
    assert!(store.list_entries(company).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_foreign_account_is_rejected_atomically() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let other_company = CompanyId::new();
    let journal = store
        .get_or_create_journal(company, "OD", "Opérations Diverses")
        .await
        .unwrap();
    let (bank, _) = store
        .get_or_create_account(NewAccount::new(company, "521", "Banque"))
        .await
        .unwrap();
    let (foreign, _) = store
        .get_or_create_account(NewAccount::new(other_company, "101", "Capital social"))
        .await
        .unwrap();

    let err = store
        .commit_entry(entry(
            journal.id,
            vec![
                line(bank.id, dec!(100), Decimal::ZERO),
                line(foreign.id, Decimal::ZERO, dec!(100)),
            ],
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::AccountNotFound(id) if id == foreign.id));
    assert!(store.list_entries(company).await.unwrap().is_empty());
    assert!(store.balance_snapshot(company, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_journal_is_rejected() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let (bank, _) = store
        .get_or_create_account(NewAccount::new(company, "521", "Banque"))
        .await
        .unwrap();

    let missing = JournalId::new();
    let err = store
        .commit_entry(entry(missing, vec![line(bank.id, dec!(0.25), dec!(0.25))]))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::JournalNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_register_document_keeps_kind() {
    let store = setup_store().await;
    let company = CompanyId::new();

    let document = store
        .register_document(NewDocument {
            company_id: company,
            name: "Balance 2024".to_string(),
            file_name: "balance_2024.xlsx".to_string(),
            kind: DocumentKind::Balance,
        })
        .await
        .unwrap();

    assert_eq!(document.company_id, company);
    assert_eq!(document.kind, DocumentKind::Balance);
    assert_eq!(document.file_name, "balance_2024.xlsx");
}

#[tokio::test]
async fn test_reconciled_import_books_suspense_gap() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let reconciler = Reconciler::new(&store);

    let result = reconciler
        .reconcile(
            company,
            &rows(&[
                ("601", dec!(40), dec!(0)),
                ("701", dec!(0), dec!(100)),
                ("411", dec!(0), dec!(0)),
            ]),
            2024,
            None,
        )
        .await
        .unwrap();

    assert_eq!(result.entries_count, 2);
    assert_eq!(result.accounts_created, 2);
    assert_eq!(result.skipped_rows, 1);
    assert_eq!(result.gap, dec!(-60));

    let snapshot = store.balance_snapshot(company, None).await.unwrap();
    assert_eq!(snapshot.get("4799").map(|t| t.debit), Some(dec!(60)));
    assert_eq!(snapshot.total_debit(), snapshot.total_credit());

    let entries = store.list_entries(company).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reference, "BG-2024");
    assert_eq!(entries[0].lines.len(), 3);
}

#[tokio::test]
async fn test_reimport_matches_existing_accounts() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let reconciler = Reconciler::new(&store);
    let balance = rows(&[("521", dec!(250), dec!(0)), ("101", dec!(0), dec!(250))]);

    let first = reconciler.reconcile(company, &balance, 2024, None).await.unwrap();
    let second = reconciler.reconcile(company, &balance, 2025, None).await.unwrap();

    assert_eq!(first.accounts_created, 2);
    assert_eq!(second.accounts_created, 0);
    assert_eq!(second.accounts_matched, 2);
    assert_eq!(store.list_accounts(company).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_snapshot_scoped_by_document() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let reconciler = Reconciler::new(&store);

    let mut documents = Vec::new();
    for year in [2023, 2024] {
        let document = store
            .register_document(NewDocument {
                company_id: company,
                name: format!("Balance {year}"),
                file_name: format!("balance_{year}.csv"),
                kind: DocumentKind::Balance,
            })
            .await
            .unwrap();
        reconciler
            .reconcile(
                company,
                &rows(&[("521", dec!(1000), dec!(0)), ("101", dec!(0), dec!(1000))]),
                year,
                Some(document.id),
            )
            .await
            .unwrap();
        documents.push(document);
    }

    let all = store.balance_snapshot(company, None).await.unwrap();
    let latest = store
        .balance_snapshot(company, Some(documents[1].id))
        .await
        .unwrap();

    assert_eq!(all.get("521").map(|t| t.debit), Some(dec!(2000)));
    assert_eq!(latest.get("521").map(|t| t.debit), Some(dec!(1000)));
    assert_eq!(latest.net_balances().get("101"), Some(&dec!(-1000)));
}

#[tokio::test]
async fn test_snapshot_sums_lines_per_account() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let journal = store
        .get_or_create_journal(company, "OD", "Opérations Diverses")
        .await
        .unwrap();
    let (bank, _) = store
        .get_or_create_account(NewAccount::new(company, "521", "Banque"))
        .await
        .unwrap();
    let (capital, _) = store
        .get_or_create_account(NewAccount::new(company, "101", "Capital social"))
        .await
        .unwrap();
    let (supplier, _) = store
        .get_or_create_account(NewAccount::new(company, "401", "Fournisseurs"))
        .await
        .unwrap();

    store
        .commit_entry(entry(
            journal.id,
            vec![
                line(bank.id, dec!(300), Decimal::ZERO),
                line(bank.id, dec!(200), Decimal::ZERO),
                line(capital.id, Decimal::ZERO, dec!(500)),
            ],
        ))
        .await
        .unwrap();
    store
        .commit_entry(entry(
            journal.id,
            vec![
                line(supplier.id, dec!(50), Decimal::ZERO),
                line(bank.id, Decimal::ZERO, dec!(50)),
            ],
        ))
        .await
        .unwrap();

    let snapshot = store.balance_snapshot(company, None).await.unwrap();

    assert_eq!(snapshot.len(), 3);
    let bank_totals = snapshot.get("521").unwrap();
    assert_eq!(bank_totals.debit, dec!(500));
    assert_eq!(bank_totals.credit, dec!(50));
    assert_eq!(snapshot.net_balances().get("521"), Some(&dec!(450)));
    assert_eq!(snapshot.total_debit(), dec!(550));
    assert_eq!(snapshot.total_credit(), dec!(550));
}

#[tokio::test]
async fn test_commit_rejects_document_of_other_company() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let journal = store
        .get_or_create_journal(company, "OD", "Opérations Diverses")
        .await
        .unwrap();
    let (bank, _) = store
        .get_or_create_account(NewAccount::new(company, "521", "Banque"))
        .await
        .unwrap();
    let foreign = store
        .register_document(NewDocument {
            company_id: CompanyId::new(),
            name: "Balance 2024".to_string(),
            file_name: "balance_2024.xlsx".to_string(),
            kind: DocumentKind::Balance,
        })
        .await
        .unwrap();

    let mut scoped = entry(journal.id, vec![line(bank.id, dec!(1), dec!(1))]);
    scoped.document_id = Some(foreign.id);
    let err = store.commit_entry(scoped).await.unwrap_err();

    assert!(matches!(err, LedgerError::DocumentNotFound(id) if id == foreign.id));
    assert!(store.list_entries(company).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_import_of_zero_grid_registers_no_document() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let grid: RawTable = [
        ["Compte", "Libellé", "Débit", "Crédit"],
        ["512", "Banque", "0", "0"],
        ["TOTAUX", "", "0", "0"],
    ]
    .iter()
    .map(|r| r.iter().copied())
    .collect();
    let parsed = BalanceParser::parse(&grid, "balance_2024.xlsx").unwrap();

    let err = Reconciler::new(&store)
        .import_document(
            &parsed,
            NewDocument {
                company_id: company,
                name: "Balance 2024".to_string(),
                file_name: "balance_2024.xlsx".to_string(),
                kind: DocumentKind::Balance,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::EmptyImport));
    assert!(store.list_documents(company).await.unwrap().is_empty());
    assert!(store.list_accounts(company).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_import_document_links_entry() {
    let store = setup_store().await;
    let company = CompanyId::new();
    let grid: RawTable = [
        ["Compte", "Libellé", "Débit", "Crédit"],
        ["521", "Banque", "750", ""],
        ["101", "Capital", "", "750"],
    ]
    .iter()
    .map(|r| r.iter().copied())
    .collect();
    let parsed = BalanceParser::parse(&grid, "balance_2024.xlsx").unwrap();

    let result = Reconciler::new(&store)
        .import_document(
            &parsed,
            NewDocument {
                company_id: company,
                name: "Balance 2024".to_string(),
                file_name: "balance_2024.xlsx".to_string(),
                kind: DocumentKind::Balance,
            },
        )
        .await
        .unwrap();

    let documents = store.list_documents(company).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(result.document_id, Some(documents[0].id));
    let scoped = store
        .balance_snapshot(company, result.document_id)
        .await
        .unwrap();
    assert_eq!(scoped.get("521").map(|t| t.debit), Some(dec!(750)));
}

#[tokio::test]
async fn test_seed_standard_chart_once() {
    let store = setup_store().await;
    let company = CompanyId::new();

    let created = seed_standard_chart(&store, company).await.unwrap();
    assert!(created > 0);
    assert_eq!(seed_standard_chart(&store, company).await.unwrap(), 0);
    assert!(store.find_account(company, "101").await.unwrap().is_some());
}
