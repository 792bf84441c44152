//! Trial balance parser.
//!
//! Turns a raw grid of unknown shape into normalized balance rows:
//!
//! 1. Find a header row among the first rows (keyword match).
//! 2. Resolve column roles by name, or by column count when there is no header.
//! 3. Detect the fiscal year from the file name.
//! 4. Normalize each data row, skipping subtotals, separators and zero rows.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::amount::parse_amount;
use super::columns::{positional_layout, resolve_named};
use super::error::ImportError;
use super::header::{find_header_row, looks_like_code};
use super::types::{BalanceRow, ColumnMap, ParsedBalance, RawCell, RawTable};

/// Label used when the input has no label column.
pub const DEFAULT_LABEL: &str = "Solde Initial";

static FISCAL_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(20\d{2})(?:\D|$)").expect("fiscal year pattern is valid"));

static NUMERIC_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.0+$").expect("numeric suffix pattern is valid"));

/// Extracts a 4-digit year starting with "20" from a file name.
#[must_use]
pub fn detect_fiscal_year(filename: &str) -> Option<i32> {
    FISCAL_YEAR
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Normalizes an account code: whitespace removed, trailing ".0" dropped.
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    NUMERIC_SUFFIX.replace(&compact, "").into_owned()
}

fn is_skippable_code(code: &str) -> bool {
    let lower = code.to_lowercase();
    code.is_empty()
        || lower == "nan"
        || lower.starts_with("total")
        || lower.starts_with("totaux")
        || !looks_like_code(code)
}

/// Stateless trial balance parser.
pub struct BalanceParser;

impl BalanceParser {
    /// Parses a raw table into normalized balance rows.
    ///
    /// `filename_hint` is only used for fiscal year detection; the current
    /// calendar year is used when it contains none.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::MissingAccountColumn` if no account code column
    /// can be identified. Every other data issue is recovered from and
    /// reported in `warnings` or `skipped_rows`.
    pub fn parse(table: &RawTable, filename_hint: &str) -> Result<ParsedBalance, ImportError> {
        let rows = table.rows();
        let width = table.width();
        let header_row = find_header_row(rows);

        let (columns, data_start) = match header_row {
            Some(index) => (Self::named_columns(&rows[index], width)?, index + 1),
            None => {
                let columns = positional_layout(width)
                    .ok_or(ImportError::MissingAccountColumn { columns: Vec::new() })?;
                (columns, 0)
            }
        };

        let mut parsed_rows = Vec::new();
        let mut skipped_rows = 0;
        let mut warnings = Vec::new();

        for (index, row) in rows.iter().enumerate().skip(data_start) {
            if row.iter().all(RawCell::is_empty) {
                continue;
            }
            let row_number = index + 1;

            let code = normalize_code(&cell(row, Some(columns.account)).as_text());
            if is_skippable_code(&code) {
                skipped_rows += 1;
                continue;
            }

            let label = match columns.label {
                None => DEFAULT_LABEL.to_string(),
                Some(col) => {
                    let text = cell(row, Some(col)).as_text();
                    if text.is_empty() { format!("Compte {code}") } else { text }
                }
            };

            let mut amount = |col: Option<usize>| {
                let raw = cell(row, col);
                parse_amount(raw).unwrap_or_else(|| {
                    warn!(row = row_number, raw = %raw, "unparsable amount treated as zero");
                    warnings.push(format!(
                        "Row {row_number}: unparsable amount '{raw}' treated as 0"
                    ));
                    Decimal::ZERO
                })
            };

            let (debit, credit) = if columns.debit.is_some() || columns.credit.is_some() {
                (amount(columns.debit), amount(columns.credit))
            } else {
                let balance = amount(columns.balance);
                (balance, Decimal::ZERO)
            };

            let balance_row = BalanceRow::new(code, label, debit, credit);
            if balance_row.is_zero() {
                skipped_rows += 1;
                continue;
            }
            parsed_rows.push(balance_row);
        }

        let fiscal_year = detect_fiscal_year(filename_hint).unwrap_or_else(|| Utc::now().year());

        debug!(
            filename = filename_hint,
            fiscal_year,
            header_row = ?header_row,
            rows = parsed_rows.len(),
            skipped_rows,
            "trial balance parsed"
        );

        Ok(ParsedBalance {
            fiscal_year,
            rows: parsed_rows,
            skipped_rows,
            warnings,
            columns,
            header_row,
        })
    }

    /// Column roles from a header row, with positional amounts as fallback.
    fn named_columns(header: &[RawCell], width: usize) -> Result<ColumnMap, ImportError> {
        let names: Vec<String> = (0..width.max(header.len()))
            .map(|i| header.get(i).map(RawCell::as_text).unwrap_or_default())
            .collect();

        let mut columns = resolve_named(&names).ok_or_else(|| ImportError::MissingAccountColumn {
            columns: names.iter().filter(|n| !n.is_empty()).cloned().collect(),
        })?;

        if !columns.has_amounts() {
            if let Some(positional) = positional_layout(width) {
                columns.debit = positional.debit;
                columns.credit = positional.credit;
                columns.balance = positional.balance;
            }
        }
        Ok(columns)
    }
}

fn cell(row: &[RawCell], col: Option<usize>) -> &RawCell {
    const EMPTY: &RawCell = &RawCell::Empty;
    col.and_then(|c| row.get(c)).unwrap_or(EMPTY)
}
