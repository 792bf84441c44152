//! Balance générale (trial balance) report.

use std::collections::HashMap;
use std::io::Write;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use crate::ledger::BalanceSnapshot;
use crate::ledger::types::DEFAULT_ENTRY_TOLERANCE;

/// One account line of the trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account code.
    #[serde(rename = "Compte")]
    pub code: String,
    /// Account name.
    #[serde(rename = "Intitulé")]
    pub name: String,
    /// Total debit movements.
    #[serde(rename = "Mouvement débit")]
    pub movement_debit: Decimal,
    /// Total credit movements.
    #[serde(rename = "Mouvement crédit")]
    pub movement_credit: Decimal,
    /// Closing debit balance.
    #[serde(rename = "Solde débiteur")]
    pub balance_debit: Decimal,
    /// Closing credit balance.
    #[serde(rename = "Solde créditeur")]
    pub balance_credit: Decimal,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Σ movement debit.
    pub movement_debit: Decimal,
    /// Σ movement credit.
    pub movement_credit: Decimal,
    /// Σ closing debit balances.
    pub balance_debit: Decimal,
    /// Σ closing credit balances.
    pub balance_credit: Decimal,
    /// Whether debits equal credits within tolerance.
    pub is_balanced: bool,
}

/// Trial balance ordered by account code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Account lines.
    pub rows: Vec<TrialBalanceRow>,
    /// Column totals.
    pub totals: TrialBalanceTotals,
}

impl TrialBalance {
    /// Builds the trial balance of a snapshot.
    ///
    /// Accounts missing from `names` are labelled "Compte {code}".
    #[must_use]
    pub fn from_snapshot(snapshot: &BalanceSnapshot, names: &HashMap<String, String>) -> Self {
        let rows: Vec<TrialBalanceRow> = snapshot
            .iter()
            .map(|(code, totals)| {
                let net = totals.net();
                TrialBalanceRow {
                    code: code.to_string(),
                    name: names
                        .get(code)
                        .cloned()
                        .unwrap_or_else(|| format!("Compte {code}")),
                    movement_debit: totals.debit,
                    movement_credit: totals.credit,
                    balance_debit: net.max(Decimal::ZERO),
                    balance_credit: (-net).max(Decimal::ZERO),
                }
            })
            .collect();

        let mut totals = TrialBalanceTotals::default();
        for row in &rows {
            totals.movement_debit += row.movement_debit;
            totals.movement_credit += row.movement_credit;
            totals.balance_debit += row.balance_debit;
            totals.balance_credit += row.balance_credit;
        }
        totals.is_balanced =
            (totals.movement_debit - totals.movement_credit).abs() <= DEFAULT_ENTRY_TOLERANCE;

        Self { rows, totals }
    }

    /// Writes the rows as `;`-separated CSV with French headers.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ReportError> {
        let mut csv = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
        for row in &self.rows {
            csv.serialize(row).map_err(|e| ReportError::Csv(e.to_string()))?;
        }
        csv.flush()?;
        Ok(())
    }
}
