//! Table readers for spreadsheet and delimited-text trial balances.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use calamine::{Data, Reader, open_workbook_auto};
use rust_decimal::Decimal;

use super::error::ImportError;
use super::types::{RawCell, RawTable};

/// Reads the first worksheet of a workbook, or a delimited text file.
///
/// # Errors
///
/// Returns `ImportError::UnsupportedFormat` for unknown extensions and an I/O,
/// spreadsheet or CSV error when the file cannot be read.
pub fn read_table(path: &Path) -> Result<RawTable, ImportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path),
        "csv" | "txt" | "tsv" => {
            let content = read_file_as_utf8(path)?;
            let delimiter = if extension == "tsv" {
                b'\t'
            } else {
                sniff_delimiter(&content)
            };
            parse_delimited(&content, delimiter)
        }
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

fn read_workbook(path: &Path) -> Result<RawTable, ImportError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ImportError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::EmptyWorkbook)?
        .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(RawTable::new(rows))
}

fn cell_from_data(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::text(s.clone()),
        Data::Int(n) => RawCell::Number(Decimal::from(*n)),
        // Shortest round-trip rendering keeps 1234.56 exact.
        Data::Float(f) => Decimal::from_str(&f.to_string())
            .map_or_else(|_| RawCell::text(f.to_string()), RawCell::Number),
        other => RawCell::text(other.to_string()),
    }
}

/// Detects the most likely field delimiter from the first lines.
///
/// Each candidate (tab, semicolon, comma, pipe) is scored by how many lines
/// share the first line's field count, times that count.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for &delimiter in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delimiter)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(Result::ok)
                    .map_or(1, |r| r.len())
            })
            .collect();

        let Some(&target) = counts.first() else {
            continue;
        };
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count();
        let score = consistent * target;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }

    best
}

/// Reads a file as UTF-8, falling back to Windows-1252 for legacy exports.
fn read_file_as_utf8(path: &Path) -> Result<String, ImportError> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)?.read_to_end(&mut bytes)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

fn parse_delimited(content: &str, delimiter: u8) -> Result<RawTable, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Csv(e.to_string()))?;
        rows.push(record.iter().map(RawCell::text).collect());
    }
    Ok(RawTable::new(rows))
}
