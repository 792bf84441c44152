//! Property-based tests for the balance parser.
//!
//! Feature: balance-import
//! - Property: Column order independence
//! - Property: Normalized amounts are non-negative

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::parser::BalanceParser;
use super::types::{RawCell, RawTable};

const HEADERS_4: &[&str] = &["Compte", "Libellé", "Solde Débit", "Solde Crédit"];
const HEADERS_6: &[&str] = &[
    "Compte",
    "Libellé",
    "Mvt Débit",
    "Mvt Crédit",
    "Solde Débit",
    "Solde Crédit",
];
const HEADERS_8: &[&str] = &[
    "Compte",
    "Libellé",
    "Débit Mvt",
    "Crédit Mvt",
    "AN D",
    "AN C",
    "Solde D",
    "Solde C",
];

/// Strategy to generate amounts (0.00 to 100,000.00, zero included).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a data row for a layout of `width` columns.
fn data_row(width: usize) -> impl Strategy<Value = Vec<RawCell>> {
    (
        10u32..99_999u32,
        prop::collection::vec(amount(), width - 2),
    )
        .prop_map(|(code, amounts)| {
            let mut row = vec![
                RawCell::text(code.to_string()),
                RawCell::text(format!("Compte {code}")),
            ];
            row.extend(amounts.into_iter().map(RawCell::Number));
            row
        })
}

/// Strategy to generate a header, rows and a column permutation.
fn layout() -> impl Strategy<Value = (Vec<&'static str>, Vec<Vec<RawCell>>, Vec<usize>)> {
    prop_oneof![Just(HEADERS_4), Just(HEADERS_6), Just(HEADERS_8)].prop_flat_map(|headers| {
        let width = headers.len();
        (
            Just(headers.to_vec()),
            prop::collection::vec(data_row(width), 1..15),
            Just((0..width).collect::<Vec<usize>>()).prop_shuffle(),
        )
    })
}

fn build_table(headers: &[&str], rows: &[Vec<RawCell>], order: &[usize]) -> RawTable {
    let mut table = vec![order.iter().map(|&i| RawCell::text(headers[i])).collect()];
    table.extend(
        rows.iter()
            .map(|row| order.iter().map(|&i| row[i].clone()).collect::<Vec<RawCell>>()),
    );
    RawTable::new(table)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* 4/6/8-column balance with a header row, permuting the physical
    /// columns SHALL NOT change the normalized rows.
    #[test]
    fn prop_column_order_does_not_matter((headers, rows, order) in layout()) {
        let identity: Vec<usize> = (0..headers.len()).collect();
        let reference = BalanceParser::parse(&build_table(&headers, &rows, &identity), "b_2024.csv").unwrap();
        let shuffled = BalanceParser::parse(&build_table(&headers, &rows, &order), "b_2024.csv").unwrap();

        prop_assert_eq!(reference.rows, shuffled.rows);
        prop_assert_eq!(reference.skipped_rows, shuffled.skipped_rows);
    }

    /// *For any* signed debit/credit input, normalized rows SHALL carry
    /// non-negative amounts and preserve the net (debit − credit).
    #[test]
    fn prop_amounts_are_non_negative(
        debit in -10_000_000i64..10_000_000i64,
        credit in -10_000_000i64..10_000_000i64,
    ) {
        let debit = Decimal::new(debit, 2);
        let credit = Decimal::new(credit, 2);
        let table = RawTable::new(vec![vec![
            RawCell::text("411"),
            RawCell::text("Clients"),
            RawCell::Number(debit),
            RawCell::Number(credit),
        ]]);

        let parsed = BalanceParser::parse(&table, "b_2024.csv").unwrap();
        for row in &parsed.rows {
            prop_assert!(row.debit >= Decimal::ZERO);
            prop_assert!(row.credit >= Decimal::ZERO);
            prop_assert_eq!(row.debit - row.credit, debit - credit);
        }
    }
}
