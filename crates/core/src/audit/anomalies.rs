//! Entry anomaly detection.

use auditia_shared::types::{EntryId, EntryLineId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::Entry;

/// Shortest entry label considered meaningful.
pub const MIN_LABEL_CHARS: usize = 3;

/// Kind of anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    /// Entry label missing or too short to explain the operation.
    MissingContext,
    /// Large line amount that is an exact multiple of 1,000.
    SuspiciousRoundAmount,
}

impl AnomalyKind {
    /// Stable code for reports.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingContext => "MISSING_CONTEXT",
            Self::SuspiciousRoundAmount => "SUSPICIOUS_ROUND_AMOUNT",
        }
    }
}

/// Anomaly severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Worth a look.
    Low,
    /// Should be reviewed before closing.
    Medium,
}

/// A finding on one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Entry concerned.
    pub entry_id: EntryId,
    /// Line concerned, for line-level findings.
    pub line_id: Option<EntryLineId>,
    /// Entry date.
    pub date: NaiveDate,
    /// What was found.
    pub kind: AnomalyKind,
    /// How serious it is.
    pub severity: Severity,
    /// Human-readable explanation.
    pub description: String,
}

/// Scans entries for anomalies, in entry then line order.
#[must_use]
pub fn detect_anomalies(entries: &[Entry]) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for entry in entries {
        if entry.label.trim().chars().count() < MIN_LABEL_CHARS {
            anomalies.push(Anomaly {
                entry_id: entry.id,
                line_id: None,
                date: entry.date,
                kind: AnomalyKind::MissingContext,
                severity: Severity::Medium,
                description: format!("Entry {} has no meaningful label", entry.reference),
            });
        }

        for line in &entry.lines {
            let amount = line.amount();
            if is_round_amount(amount) {
                anomalies.push(Anomaly {
                    entry_id: entry.id,
                    line_id: Some(line.id),
                    date: entry.date,
                    kind: AnomalyKind::SuspiciousRoundAmount,
                    severity: Severity::Low,
                    description: format!(
                        "Round amount {amount} on account {} in entry {}",
                        line.account_code, entry.reference
                    ),
                });
            }
        }
    }

    anomalies
}

fn is_round_amount(amount: Decimal) -> bool {
    amount > Decimal::ONE_THOUSAND && (amount % Decimal::ONE_THOUSAND).is_zero()
}
