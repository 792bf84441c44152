//! Report mapping configuration.
//!
//! A mapping ties template cells to rules. It is stored as a JSON object whose
//! keys are `"Sheet!A1"` references and whose values are rule strings, e.g.
//! `{"BILAN ACTIF!E13": "ABS(211*)", "'COMPTE DE RESULTAT'!F5": "-70*"}`.
//! Key order is preserved so the injector log follows the configuration.

use std::fmt;
use std::str::FromStr;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rule::{MappingRule, RuleError};

/// Last column Excel supports (XFD).
const MAX_COLUMN: u32 = 16_384;
/// Last row Excel supports.
const MAX_ROW: u32 = 1_048_576;

/// Errors raised while loading a mapping configuration.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The configuration is not valid JSON.
    #[error("Invalid mapping JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A cell address cannot be parsed.
    #[error("Invalid cell address '{0}'")]
    InvalidCell(String),
}

impl MappingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Json(_) => "INVALID_MAPPING",
            Self::InvalidCell(_) => "INVALID_CELL",
        }
    }
}

/// A 1-based worksheet cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    /// Row number, starting at 1.
    pub row: u32,
    /// Column number, starting at 1 (A = 1).
    pub col: u32,
}

impl CellAddress {
    /// Creates an address from 1-based coordinates.
    #[must_use]
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Column letters (1 → "A", 27 → "AA").
    #[must_use]
    pub fn column_letters(&self) -> String {
        let mut letters = Vec::new();
        let mut n = self.col;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

impl FromStr for CellAddress {
    type Err = MappingError;

    /// Parses `A1`, `$E$13` or `xfd1048576`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MappingError::InvalidCell(s.to_string());
        let cleaned: String = s.trim().chars().filter(|c| *c != '$').collect();
        let split = cleaned
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = cleaned.split_at(split);

        if letters.is_empty() || letters.len() > 3 || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let col = letters
            .bytes()
            .map(|b| u32::from(b.to_ascii_uppercase() - b'A') + 1)
            .fold(0u32, |acc, d| acc * 26 + d);
        let row: u32 = digits.parse().map_err(|_| invalid())?;

        if row == 0 || row > MAX_ROW || col > MAX_COLUMN {
            return Err(invalid());
        }
        Ok(Self { row, col })
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row)
    }
}

/// One valid `(sheet, cell, rule)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Index of the item in the configuration.
    pub position: usize,
    /// Configuration key as written.
    pub key: String,
    /// Target sheet, `None` for the workbook's active sheet.
    pub sheet: Option<String>,
    /// Target cell.
    pub cell: CellAddress,
    /// Parsed rule.
    pub rule: MappingRule,
    /// Rule text as written.
    pub rule_text: String,
}

/// A configuration item that could not be turned into an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// Index of the item in the configuration.
    pub position: usize,
    /// Configuration key as written.
    pub key: String,
    /// Rule text as written.
    pub rule: String,
    /// Why the item was rejected.
    pub reason: String,
}

/// Ordered cell-to-rule mapping of one report template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportMapping {
    /// Valid entries, in configuration order.
    pub entries: Vec<MappingEntry>,
    /// Malformed items, in configuration order.
    pub rejected: Vec<RejectedEntry>,
}

impl ReportMapping {
    /// Loads a mapping from its JSON object form.
    ///
    /// Malformed keys or rules are kept in `rejected`; only a document that is
    /// not a JSON object fails.
    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let OrderedPairs(pairs) = serde_json::from_str(json)?;
        Ok(Self::from_pairs(pairs))
    }

    /// Builds a mapping from `(key, rule)` pairs.
    pub fn from_pairs<I, K, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<String>,
    {
        let mut mapping = Self::default();
        for (position, (key, rule)) in pairs.into_iter().enumerate() {
            let key = key.into();
            let rule_text = rule.into();
            match parse_entry(&key, &rule_text) {
                Ok((sheet, cell, rule)) => mapping.entries.push(MappingEntry {
                    position,
                    key,
                    sheet,
                    cell,
                    rule,
                    rule_text,
                }),
                Err(reason) => mapping.rejected.push(RejectedEntry {
                    position,
                    key,
                    rule: rule_text,
                    reason,
                }),
            }
        }
        mapping
    }

    /// Total number of configured items, valid or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() + self.rejected.len()
    }

    /// Returns true if nothing is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_entry(
    key: &str,
    rule: &str,
) -> Result<(Option<String>, CellAddress, MappingRule), String> {
    let (sheet, cell) = split_reference(key);
    let cell: CellAddress = cell.parse().map_err(|e: MappingError| e.to_string())?;
    let rule: MappingRule = rule.parse().map_err(|e: RuleError| e.to_string())?;
    Ok((sheet, cell, rule))
}

/// Splits `Sheet!A1` at the last `!`, unquoting `'My Sheet'!A1`.
fn split_reference(key: &str) -> (Option<String>, &str) {
    match key.rsplit_once('!') {
        Some((sheet, cell)) => {
            let sheet = sheet.trim();
            let sheet = sheet
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .map_or_else(|| sheet.to_string(), |s| s.replace("''", "'"));
            (Some(sheet), cell)
        }
        None => (None, key),
    }
}

/// JSON object read as key/value pairs in document order.
struct OrderedPairs(Vec<(String, String)>);

impl<'de> Deserialize<'de> for OrderedPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = OrderedPairs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of \"Sheet!Cell\": \"rule\" pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                    let rule = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    pairs.push((key, rule));
                }
                Ok(OrderedPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A1", 1, 1)]
    #[case("E13", 13, 5)]
    #[case("$E$13", 13, 5)]
    #[case("z9", 9, 26)]
    #[case("AA1", 1, 27)]
    #[case("XFD1048576", 1_048_576, 16_384)]
    fn test_parse_cell(#[case] raw: &str, #[case] row: u32, #[case] col: u32) {
        assert_eq!(raw.parse::<CellAddress>().unwrap(), CellAddress::new(row, col));
    }

    #[rstest]
    #[case("")]
    #[case("13")]
    #[case("E")]
    #[case("E0")]
    #[case("E1x")]
    #[case("XFE1")]
    #[case("ABCD1")]
    fn test_parse_cell_rejects(#[case] raw: &str) {
        assert!(raw.parse::<CellAddress>().is_err());
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellAddress::new(13, 5).to_string(), "E13");
        assert_eq!(CellAddress::new(1, 27).to_string(), "AA1");
        assert_eq!(CellAddress::new(2, 702).to_string(), "ZZ2");
    }

    #[test]
    fn test_from_json_keeps_order() {
        let mapping = ReportMapping::from_json(
            r#"{"BILAN PASSIF!E5": "-10*", "BILAN ACTIF!E13": "ABS(211*)", "BILAN ACTIF!A2": "52*"}"#,
        )
        .unwrap();

        let keys: Vec<&str> = mapping.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["BILAN PASSIF!E5", "BILAN ACTIF!E13", "BILAN ACTIF!A2"]);
        assert_eq!(mapping.entries[1].sheet.as_deref(), Some("BILAN ACTIF"));
        assert_eq!(mapping.entries[1].cell, CellAddress::new(13, 5));
        assert!(mapping.entries[1].rule.abs);
    }

    #[test]
    fn test_quoted_sheet_and_active_sheet() {
        let mapping = ReportMapping::from_pairs([
            ("'Résultat fiscal'!C4", "89*"),
            ("'L''annexe'!B2", "1*"),
            ("D7", "70*"),
        ]);

        assert_eq!(mapping.entries[0].sheet.as_deref(), Some("Résultat fiscal"));
        assert_eq!(mapping.entries[1].sheet.as_deref(), Some("L'annexe"));
        assert_eq!(mapping.entries[2].sheet, None);
    }

    #[test]
    fn test_malformed_items_are_rejected_not_fatal() {
        let mapping = ReportMapping::from_json(
            r#"{"BILAN ACTIF!E13": "21*", "BILAN ACTIF!??": "21*", "BILAN ACTIF!E14": "2*1", "BILAN ACTIF!E15": 42}"#,
        )
        .unwrap();

        assert_eq!(mapping.entries.len(), 2);
        assert_eq!(mapping.entries[1].rule_text, "42");
        assert_eq!(mapping.rejected.len(), 2);
        assert_eq!(mapping.rejected[0].key, "BILAN ACTIF!??");
        assert!(mapping.rejected[1].reason.contains("2*1"));
        let positions: Vec<usize> = mapping.rejected.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(mapping.entries[1].position, 3);
        assert_eq!(mapping.len(), 4);
    }

    #[test]
    fn test_non_object_fails() {
        let err = ReportMapping::from_json("[1, 2]").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_MAPPING");
    }
}
