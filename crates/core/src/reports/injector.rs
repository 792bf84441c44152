//! Template injection.
//!
//! Evaluates every mapping entry against a balance map and writes the
//! results into a copy of the template:
//! 1. Rejected mapping items are logged as errors in configuration order
//! 2. Entries on sheets the template lacks are skipped with a warning
//! 3. Cells inside merged ranges are redirected to the range's master cell
//! 4. The output workbook is saved with only the mapped cells changed

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::ReportError;
use super::mapping::{CellAddress, RejectedEntry, ReportMapping};
use super::xlsx::{CellPatches, CellRange, TemplateWorkbook};

/// One line of the injection log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InjectionLogEntry {
    /// Value written to the requested cell.
    Write {
        /// Sheet name.
        sheet: String,
        /// Target cell.
        cell: String,
        /// Written value.
        value: Decimal,
    },
    /// Value written to the master cell of a merged range.
    MergedWrite {
        /// Sheet name.
        sheet: String,
        /// Cell named in the mapping.
        requested: String,
        /// Top-left cell of the merged range.
        master: String,
        /// Written value.
        value: Decimal,
    },
    /// Entry skipped because the template lacks the sheet.
    SkippedSheet {
        /// Mapping key.
        key: String,
        /// Missing sheet name.
        sheet: String,
    },
    /// Entry that could not be processed.
    Error {
        /// Mapping key.
        key: String,
        /// What went wrong.
        message: String,
    },
}

impl fmt::Display for InjectionLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write { sheet, cell, value } => write!(f, "WRITE  → {sheet}!{cell} = {value}"),
            Self::MergedWrite {
                sheet,
                requested,
                master,
                value,
            } => write!(f, "WRITE  → {sheet}!{master} = {value} (merged, requested {requested})"),
            Self::SkippedSheet { key, sheet } => {
                write!(f, "SKIP   → {key}: sheet '{sheet}' not found in template")
            }
            Self::Error { key, message } => write!(f, "ERROR  → {key}: {message}"),
        }
    }
}

/// Outcome of a report generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionReport {
    /// Generated workbook.
    pub output_path: PathBuf,
    /// Every write, skip and error, in configuration order.
    pub log: Vec<InjectionLogEntry>,
    /// Cells written.
    pub written: usize,
    /// Entries skipped for a missing sheet.
    pub skipped: usize,
    /// Entries that failed.
    pub errors: usize,
}

impl InjectionReport {
    /// Log rendered one entry per line.
    #[must_use]
    pub fn log_lines(&self) -> Vec<String> {
        self.log.iter().map(ToString::to_string).collect()
    }
}

/// Writes mapped balances into spreadsheet templates.
pub struct TemplateInjector;

impl TemplateInjector {
    /// Generates `output_path` from `template_path`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::EmptyBalance` when `balances` is empty,
    /// `ReportError::TemplateNotFound` when the template file is missing, and
    /// archive or XML errors when the workbook cannot be read or written.
    /// Missing sheets and malformed mapping items never fail the generation.
    pub fn generate(
        template_path: &Path,
        output_path: &Path,
        mapping: &ReportMapping,
        balances: &BTreeMap<String, Decimal>,
    ) -> Result<InjectionReport, ReportError> {
        if balances.is_empty() {
            return Err(ReportError::EmptyBalance);
        }
        if !template_path.is_file() {
            return Err(ReportError::TemplateNotFound(template_path.to_path_buf()));
        }

        let mut workbook = TemplateWorkbook::open(template_path)?;
        let mut log = Vec::with_capacity(mapping.len());

        let mut rejected = mapping.rejected.iter().peekable();
        let mut patches: HashMap<String, CellPatches> = HashMap::new();
        let mut merged: HashMap<String, Vec<CellRange>> = HashMap::new();

        for entry in &mapping.entries {
            while let Some(item) = rejected.next_if(|r| r.position < entry.position) {
                log.push(rejected_entry(item));
            }

            let sheet = match &entry.sheet {
                Some(name) => workbook.worksheet(name).cloned(),
                None => workbook.active_worksheet().cloned(),
            };
            let Some(sheet) = sheet else {
                let name = entry.sheet.clone().unwrap_or_default();
                warn!(key = %entry.key, sheet = %name, "template sheet not found, entry skipped");
                log.push(InjectionLogEntry::SkippedSheet {
                    key: entry.key.clone(),
                    sheet: name,
                });
                continue;
            };

            if !merged.contains_key(&sheet.path) {
                let ranges = workbook.merged_ranges(&sheet.path)?;
                merged.insert(sheet.path.clone(), ranges);
            }
            let master = merged
                .get(&sheet.path)
                .and_then(|ranges| ranges.iter().find(|r| r.contains(entry.cell)))
                .map_or(entry.cell, |r| r.first);

            let value = entry.rule.evaluate(balances);
            debug!(sheet = %sheet.name, cell = %master, rule = %entry.rule_text, %value, "cell write");

            log.push(write_entry(&sheet.name, entry.cell, master, value));
            patches.entry(sheet.path).or_default().insert(master, value);
        }

        log.extend(rejected.map(rejected_entry));

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        workbook.save(output_path, &patches)?;

        let report = summarize(output_path, log);
        info!(
            template = %template_path.display(),
            output = %output_path.display(),
            written = report.written,
            skipped = report.skipped,
            errors = report.errors,
            "report generated"
        );
        Ok(report)
    }
}

fn rejected_entry(rejected: &RejectedEntry) -> InjectionLogEntry {
    warn!(key = %rejected.key, rule = %rejected.rule, reason = %rejected.reason, "invalid mapping entry");
    InjectionLogEntry::Error {
        key: rejected.key.clone(),
        message: rejected.reason.clone(),
    }
}

fn write_entry(sheet: &str, requested: CellAddress, master: CellAddress, value: Decimal) -> InjectionLogEntry {
    if requested == master {
        InjectionLogEntry::Write {
            sheet: sheet.to_string(),
            cell: master.to_string(),
            value,
        }
    } else {
        InjectionLogEntry::MergedWrite {
            sheet: sheet.to_string(),
            requested: requested.to_string(),
            master: master.to_string(),
            value,
        }
    }
}

fn summarize(output_path: &Path, log: Vec<InjectionLogEntry>) -> InjectionReport {
    let mut report = InjectionReport {
        output_path: output_path.to_path_buf(),
        log: Vec::new(),
        written: 0,
        skipped: 0,
        errors: 0,
    };
    for entry in &log {
        match entry {
            InjectionLogEntry::Write { .. } | InjectionLogEntry::MergedWrite { .. } => report.written += 1,
            InjectionLogEntry::SkippedSheet { .. } => report.skipped += 1,
            InjectionLogEntry::Error { .. } => report.errors += 1,
        }
    }
    report.log = log;
    report
}
