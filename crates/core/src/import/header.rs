//! Header row detection.

use super::types::RawCell;

/// Number of leading rows scanned for a header.
pub const HEADER_SCAN_ROWS: usize = 5;

/// Tokens that identify a header row.
const HEADER_KEYWORDS: &[&str] = &["compte", "account", "numero", "code", "libelle", "intitule"];

/// Lowercases and strips French accents.
#[must_use]
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'ç' => 'c',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ñ' => 'n',
            'ò' | 'ó' | 'ô' | 'ö' | 'õ' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ÿ' => 'y',
            other => other,
        })
        .collect()
}

/// Splits a folded column name into alphanumeric tokens.
#[must_use]
pub fn tokens(text: &str) -> Vec<String> {
    fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns true if the value starts with two digits, like an account code.
#[must_use]
pub fn looks_like_code(value: &str) -> bool {
    let mut chars = value.trim().chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit()
    )
}

fn is_header_row(row: &[RawCell]) -> bool {
    let first = row.iter().find(|c| !c.is_empty());
    match first {
        None => return false,
        Some(cell) if looks_like_code(&cell.as_text()) => return false,
        Some(_) => {}
    }

    row.iter().any(|cell| match cell {
        RawCell::Text(text) => tokens(text)
            .iter()
            .any(|t| HEADER_KEYWORDS.contains(&t.as_str())),
        RawCell::Empty | RawCell::Number(_) => false,
    })
}

/// Finds the header row among the first [`HEADER_SCAN_ROWS`] rows.
#[must_use]
pub fn find_header_row(rows: &[Vec<RawCell>]) -> Option<usize> {
    rows.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| is_header_row(row))
}
