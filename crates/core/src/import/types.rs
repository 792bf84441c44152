//! Balance import data types.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cell of a raw input grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCell {
    /// No value.
    Empty,
    /// Textual value, as found in the source.
    Text(String),
    /// Numeric value.
    Number(Decimal),
}

impl RawCell {
    /// Builds a cell from text, mapping blank strings to `Empty`.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    /// Returns true if the cell carries no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Trimmed textual rendering of the cell.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.normalize().to_string(),
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<Decimal> for RawCell {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

/// A 2-D grid of cells with unknown row/column semantics.
///
/// Rows may have different widths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Creates a table from rows.
    #[must_use]
    pub fn new(rows: Vec<Vec<RawCell>>) -> Self {
        Self { rows }
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<RawCell>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row once trailing empty cells are ignored.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1))
            .max()
            .unwrap_or(0)
    }
}

/// Builds a table from string rows. Numeric-looking cells stay textual.
impl<R, C> FromIterator<R> for RawTable
where
    R: IntoIterator<Item = C>,
    C: Into<RawCell>,
{
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

/// A normalized trial-balance line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    /// Account code.
    pub account_code: String,
    /// Account label.
    pub label: String,
    /// Debit amount (non-negative).
    pub debit: Decimal,
    /// Credit amount (non-negative).
    pub credit: Decimal,
}

impl BalanceRow {
    /// Creates a row, moving negative amounts to the opposite side.
    #[must_use]
    pub fn new(
        account_code: impl Into<String>,
        label: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        let mut d = Decimal::ZERO;
        let mut c = Decimal::ZERO;
        for (amount, is_debit) in [(debit, true), (credit, false)] {
            match (amount.is_sign_negative(), is_debit) {
                (false, true) | (true, false) => d += amount.abs(),
                (false, false) | (true, true) => c += amount.abs(),
            }
        }
        Self {
            account_code: account_code.into(),
            label: label.into(),
            debit: d,
            credit: c,
        }
    }

    /// Returns true if both sides are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

/// Logical role of an input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Account code.
    Account,
    /// Account label.
    Label,
    /// Debit amount.
    Debit,
    /// Credit amount.
    Credit,
    /// Signed net balance.
    Balance,
}

/// Resolved column indices (0-based) for each role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    /// Account code column.
    pub account: usize,
    /// Label column.
    pub label: Option<usize>,
    /// Debit column.
    pub debit: Option<usize>,
    /// Credit column.
    pub credit: Option<usize>,
    /// Net balance column.
    pub balance: Option<usize>,
}

impl ColumnMap {
    /// Column index assigned to a role.
    #[must_use]
    pub fn column(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Account => Some(self.account),
            ColumnRole::Label => self.label,
            ColumnRole::Debit => self.debit,
            ColumnRole::Credit => self.credit,
            ColumnRole::Balance => self.balance,
        }
    }

    /// Returns true if at least one amount role is assigned.
    #[must_use]
    pub fn has_amounts(&self) -> bool {
        self.debit.is_some() || self.credit.is_some() || self.balance.is_some()
    }
}

/// Output of the balance parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBalance {
    /// Detected fiscal year.
    pub fiscal_year: i32,
    /// Normalized rows in input order.
    pub rows: Vec<BalanceRow>,
    /// Non-empty data rows that were not booked.
    pub skipped_rows: usize,
    /// Recoverable issues found while parsing.
    pub warnings: Vec<String>,
    /// Resolved column mapping.
    pub columns: ColumnMap,
    /// Index of the header row, if one was found.
    pub header_row: Option<usize>,
}

impl ParsedBalance {
    /// Sum of all debits.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.rows.iter().map(|r| r.debit).sum()
    }

    /// Sum of all credits.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.rows.iter().map(|r| r.credit).sum()
    }
}

/// Parses a number the way a spreadsheet would store it.
impl FromStr for RawCell {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Decimal::from_str(s.trim()).map_or_else(|_| Self::text(s), Self::Number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_raw_cell_text() {
        assert_eq!(RawCell::text("  "), RawCell::Empty);
        assert_eq!(RawCell::text("401"), RawCell::Text("401".to_string()));
        assert_eq!(RawCell::Number(dec!(401100.00)).as_text(), "401100");
        assert!(RawCell::Text(" ".to_string()).is_empty());
    }

    #[test]
    fn test_raw_cell_from_str() {
        assert_eq!("12.5".parse::<RawCell>().unwrap(), RawCell::Number(dec!(12.5)));
        assert_eq!(
            "Clients".parse::<RawCell>().unwrap(),
            RawCell::Text("Clients".to_string())
        );
    }

    #[test]
    fn test_table_width_ignores_trailing_empties() {
        let table = RawTable::new(vec![
            vec![RawCell::text("101"), RawCell::text("Capital"), RawCell::Empty],
            vec![RawCell::text("411")],
            vec![],
        ]);
        assert_eq!(table.width(), 2);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_table_from_iter() {
        let table: RawTable = [["Compte", "Libellé"], ["101", "Capital"]].into_iter().collect();
        assert_eq!(table.rows()[1][0], RawCell::Text("101".to_string()));
    }

    #[test]
    fn test_balance_row_moves_negatives() {
        let row = BalanceRow::new("401", "Fournisseurs", dec!(-250), Decimal::ZERO);
        assert_eq!((row.debit, row.credit), (Decimal::ZERO, dec!(250)));

        let row = BalanceRow::new("411", "Clients", dec!(10), dec!(-5));
        assert_eq!((row.debit, row.credit), (dec!(15), Decimal::ZERO));

        assert!(BalanceRow::new("101", "", Decimal::ZERO, Decimal::ZERO).is_zero());
    }

    #[test]
    fn test_column_map_roles() {
        let map = ColumnMap {
            account: 0,
            label: Some(1),
            debit: None,
            credit: None,
            balance: Some(2),
        };
        assert_eq!(map.column(ColumnRole::Account), Some(0));
        assert_eq!(map.column(ColumnRole::Balance), Some(2));
        assert!(map.has_amounts());
        assert!(!ColumnMap::default().has_amounts());
    }
}
