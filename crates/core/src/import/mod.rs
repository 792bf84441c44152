//! Trial balance import.
//!
//! This module turns heterogeneous trial-balance files into normalized rows:
//! - Table readers (xlsx/xls/ods via calamine, delimited text via csv)
//! - Header detection and column-role resolution
//! - Tolerant French/English amount parsing
//! - Fiscal year detection from the file name

pub mod amount;
pub mod columns;
pub mod error;
pub mod header;
pub mod parser;
pub mod reader;
pub mod types;

#[cfg(test)]
mod parser_props;

use std::path::Path;

pub use amount::{parse_amount, parse_amount_text};
pub use error::ImportError;
pub use parser::{BalanceParser, detect_fiscal_year, normalize_code};
pub use reader::read_table;
pub use types::{BalanceRow, ColumnMap, ColumnRole, ParsedBalance, RawCell, RawTable};

/// Reads and parses a trial balance file in one step.
///
/// # Errors
///
/// Returns an error if the file cannot be read or has no account column.
pub fn parse_file(path: &Path) -> Result<ParsedBalance, ImportError> {
    let table = read_table(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    BalanceParser::parse(&table, filename)
}
