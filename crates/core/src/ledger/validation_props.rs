//! Property-based tests for entry validation rules.
//!
//! Feature: ledger-core, Property: Entry Balance Invariant

use auditia_shared::types::{AccountId, JournalId};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{DEFAULT_ENTRY_TOLERANCE, NewEntry, NewEntryLine};
use super::validation::validate_entry;

/// Strategy to generate a positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn make_line(debit: Decimal, credit: Decimal) -> NewEntryLine {
    NewEntryLine {
        account_id: AccountId::new(),
        debit,
        credit,
        label: "prop".to_string(),
    }
}

fn make_entry(lines: Vec<NewEntryLine>) -> NewEntry {
    NewEntry {
        journal_id: JournalId::new(),
        document_id: None,
        date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        reference: "BG-2024".to_string(),
        label: "Balance générale 2024".to_string(),
        validated: false,
        lines,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of debit amounts booked against one matching credit line,
    /// the entry SHALL validate.
    #[test]
    fn prop_balanced_entries_validate(
        debits in prop::collection::vec(positive_amount(), 1..20),
    ) {
        let total: Decimal = debits.iter().copied().sum();
        let mut lines: Vec<NewEntryLine> = debits
            .into_iter()
            .map(|d| make_line(d, Decimal::ZERO))
            .collect();
        lines.push(make_line(Decimal::ZERO, total));

        prop_assert!(validate_entry(&make_entry(lines), DEFAULT_ENTRY_TOLERANCE).is_ok());
    }

    /// *For any* imbalance strictly greater than the tolerance, validation SHALL
    /// reject the entry and report both totals.
    #[test]
    fn prop_imbalance_beyond_tolerance_rejected(
        amount in positive_amount(),
        extra_cents in 6i64..1_000_000i64,
    ) {
        let extra = Decimal::new(extra_cents, 2);
        let lines = vec![
            make_line(amount + extra, Decimal::ZERO),
            make_line(Decimal::ZERO, amount),
        ];

        let result = validate_entry(&make_entry(lines), DEFAULT_ENTRY_TOLERANCE);
        let is_unbalanced = matches!(
            result,
            Err(LedgerError::UnbalancedEntry { debit, credit })
                if debit == amount + extra && credit == amount
        );
        prop_assert!(is_unbalanced);
    }
}
