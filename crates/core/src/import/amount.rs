//! Tolerant amount parsing for French and English number formats.
//!
//! Accepted forms include `1 234,56`, `1.234,56`, `1,234.56`, `1234.56`,
//! `(1 234,56)` and `1 234,56-`. Thousands separators may be ordinary,
//! non-breaking or narrow non-breaking spaces, or apostrophes.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::types::RawCell;

const CURRENCY_MARKERS: &[&str] = &["FCFA", "XOF", "XAF", "CFA", "EUR", "€", "$"];

/// Parses a cell as an amount. Empty cells are zero.
///
/// Returns `None` when a non-empty cell cannot be read as a number.
#[must_use]
pub fn parse_amount(cell: &RawCell) -> Option<Decimal> {
    match cell {
        RawCell::Empty => Some(Decimal::ZERO),
        RawCell::Number(n) => Some(*n),
        RawCell::Text(s) => parse_amount_text(s),
    }
}

/// Parses a textual amount.
#[must_use]
pub fn parse_amount_text(raw: &str) -> Option<Decimal> {
    let mut text: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '\u{a0}' | '\u{202f}' | '\'' | '’'))
        .collect();

    for marker in CURRENCY_MARKERS {
        if let Some(stripped) = text.strip_suffix(marker) {
            text = stripped.to_string();
        }
        if let Some(stripped) = text.strip_prefix(marker) {
            text = stripped.to_string();
        }
    }

    if text.is_empty() || matches!(text.as_str(), "-" | "–" | "—") {
        return Some(Decimal::ZERO);
    }

    let mut negative = false;
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.to_string();
    }
    if let Some(inner) = text.strip_suffix('-') {
        negative = !negative;
        text = inner.to_string();
    }

    let normalized = normalize_separators(&text);
    let value = if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized.to_ascii_lowercase()).ok()?
    } else {
        Decimal::from_str(&normalized).ok()?
    };

    Some(if negative { -value } else { value })
}

/// Rewrites the number with `.` as the only decimal separator.
fn normalize_separators(text: &str) -> String {
    let commas = text.matches(',').count();
    let dots = text.matches('.').count();

    match (commas, dots) {
        (0, 0) => text.to_string(),
        // Both present: the last one is the decimal separator.
        (_, _) if commas > 0 && dots > 0 => {
            let last_comma = text.rfind(',').unwrap_or(0);
            let last_dot = text.rfind('.').unwrap_or(0);
            if last_comma > last_dot {
                text.replace('.', "").replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
        (1, 0) => text.replace(',', "."),
        (_, 0) => text.replace(',', ""),
        (0, 1) => text.to_string(),
        _ => text.replace('.', ""),
    }
}
