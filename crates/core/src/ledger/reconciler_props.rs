//! Property-based tests for the ledger reconciler.
//!
//! Feature: balance-import
//! - Property: Imported entries always balance
//! - Property: Re-import matches every account
//! - Property: Suspense line only beyond tolerance

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::memory::MemoryLedgerStore;
use super::reconciler::Reconciler;
use super::store::LedgerStore;
use crate::import::BalanceRow;
use auditia_shared::types::CompanyId;

/// Strategy to generate amounts (0.01 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate balance rows with distinct SYSCOHADA-like codes.
fn balance_rows() -> impl Strategy<Value = Vec<BalanceRow>> {
    prop::collection::btree_map(100u32..9_000u32, (amount(), any::<bool>()), 1..20).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(code, (amount, is_debit))| {
                    let (debit, credit) = if is_debit {
                        (amount, Decimal::ZERO)
                    } else {
                        (Decimal::ZERO, amount)
                    };
                    BalanceRow::new(code.to_string(), format!("Compte {code}"), debit, credit)
                })
                .collect()
        },
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime builds")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of rows, the committed entry SHALL balance exactly,
    /// with the suspense account absorbing the gap.
    #[test]
    fn prop_import_always_balances(rows in balance_rows()) {
        let rt = runtime();
        let store = MemoryLedgerStore::new();
        let company = CompanyId::new();

        let result = rt.block_on(Reconciler::new(&store).reconcile(company, &rows, 2024, None)).unwrap();
        let snapshot = rt.block_on(store.balance_snapshot(company, None)).unwrap();

        prop_assert_eq!(snapshot.total_debit(), snapshot.total_credit());
        prop_assert_eq!(result.entries_count, rows.len());
        prop_assert_eq!(result.gap, result.total_debit - result.total_credit);
        prop_assert_eq!(result.gap_note.is_some(), result.gap.abs() > dec!(0.01));
    }

    /// *For any* import, a second import of the same rows SHALL create no
    /// account and match exactly those created the first time.
    #[test]
    fn prop_reimport_matches_accounts(rows in balance_rows()) {
        let rt = runtime();
        let store = MemoryLedgerStore::new();
        let company = CompanyId::new();
        let reconciler = Reconciler::new(&store);

        let first = rt.block_on(reconciler.reconcile(company, &rows, 2024, None)).unwrap();
        let second = rt.block_on(reconciler.reconcile(company, &rows, 2025, None)).unwrap();

        prop_assert_eq!(first.accounts_created, rows.len());
        prop_assert_eq!(second.accounts_created, 0);
        prop_assert_eq!(second.accounts_matched, first.accounts_created);
    }
}
