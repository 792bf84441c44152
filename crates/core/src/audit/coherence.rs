//! Coherence checks over a balance snapshot.
//!
//! Four checks, each yielding a status and a message:
//! - Trial balance debits equal credits
//! - Suspense account carries no balance
//! - Balance-sheet equation: assets = equity & liabilities + result
//! - Every account belongs to a known SYSCOHADA class

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::BalanceSnapshot;
use crate::syscohada::{UNKNOWN_CLASS, class_of, is_balance_sheet_class, is_income_class};

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    /// Check holds.
    Passed,
    /// Check holds but needs attention.
    Warning,
    /// Check does not hold.
    Failed,
}

/// One coherence check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoherenceCheck {
    /// Stable check name.
    pub name: &'static str,
    /// Outcome.
    pub status: CheckStatus,
    /// Human-readable detail.
    pub message: String,
}

/// All check results for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoherenceReport {
    /// Results in evaluation order.
    pub checks: Vec<CoherenceCheck>,
}

impl CoherenceReport {
    /// Returns true if no check failed.
    #[must_use]
    pub fn is_coherent(&self) -> bool {
        self.checks.iter().all(|c| c.status != CheckStatus::Failed)
    }

    /// Looks up a check by name.
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&CoherenceCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Balance-sheet aggregates derived from a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetTotals {
    /// Net debit positions of classes 2 to 5.
    pub assets: Decimal,
    /// Net credit positions of classes 1 to 5, less class 1 debit positions.
    pub equity_and_liabilities: Decimal,
    /// Net result of classes 6 to 8 (positive for a profit).
    pub result: Decimal,
}

impl BalanceSheetTotals {
    /// Aggregates a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &BalanceSnapshot) -> Self {
        let mut totals = Self::default();
        for (code, account) in snapshot.iter() {
            let class = class_of(code);
            let net = account.net();
            if is_balance_sheet_class(class) {
                if net > Decimal::ZERO {
                    if class == 1 {
                        totals.equity_and_liabilities -= net;
                    } else {
                        totals.assets += net;
                    }
                } else {
                    totals.equity_and_liabilities -= net;
                }
            } else if is_income_class(class) {
                totals.result -= net;
            }
        }
        totals
    }

    /// assets − (equity & liabilities + result).
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.assets - (self.equity_and_liabilities + self.result)
    }
}

/// Runs every coherence check.
#[must_use]
pub fn run_coherence_checks(
    snapshot: &BalanceSnapshot,
    suspense_code: &str,
    tolerance: Decimal,
) -> CoherenceReport {
    CoherenceReport {
        checks: vec![
            trial_balance_check(snapshot, tolerance),
            suspense_check(snapshot, suspense_code),
            balance_sheet_check(snapshot, tolerance),
            account_class_check(snapshot),
        ],
    }
}

fn trial_balance_check(snapshot: &BalanceSnapshot, tolerance: Decimal) -> CoherenceCheck {
    let debit = snapshot.total_debit();
    let credit = snapshot.total_credit();
    let gap = debit - credit;
    let (status, message) = if gap.abs() <= tolerance {
        (CheckStatus::Passed, format!("Debit {debit} equals credit {credit}"))
    } else {
        (
            CheckStatus::Failed,
            format!("Debit {debit} and credit {credit} differ by {gap}"),
        )
    };
    CoherenceCheck {
        name: "trial_balance",
        status,
        message,
    }
}

fn suspense_check(snapshot: &BalanceSnapshot, suspense_code: &str) -> CoherenceCheck {
    let net = snapshot
        .get(suspense_code)
        .map_or(Decimal::ZERO, |totals| totals.net());
    let (status, message) = if net.is_zero() {
        (
            CheckStatus::Passed,
            format!("Suspense account {suspense_code} is clear"),
        )
    } else {
        (
            CheckStatus::Warning,
            format!("Suspense account {suspense_code} carries {net} pending investigation"),
        )
    };
    CoherenceCheck {
        name: "suspense_account",
        status,
        message,
    }
}

fn balance_sheet_check(snapshot: &BalanceSnapshot, tolerance: Decimal) -> CoherenceCheck {
    let totals = BalanceSheetTotals::from_snapshot(snapshot);
    let difference = totals.difference();
    let status = if difference.abs() <= tolerance {
        CheckStatus::Passed
    } else {
        CheckStatus::Failed
    };
    CoherenceCheck {
        name: "balance_sheet_equation",
        status,
        message: format!(
            "Assets {} vs equity and liabilities {} + result {} (difference {difference})",
            totals.assets, totals.equity_and_liabilities, totals.result
        ),
    }
}

fn account_class_check(snapshot: &BalanceSnapshot) -> CoherenceCheck {
    let unknown: Vec<&str> = snapshot
        .iter()
        .map(|(code, _)| code)
        .filter(|code| class_of(code) == UNKNOWN_CLASS)
        .collect();
    let (status, message) = if unknown.is_empty() {
        (CheckStatus::Passed, "All accounts have a known class".to_string())
    } else {
        (
            CheckStatus::Warning,
            format!("Accounts without a SYSCOHADA class: {}", unknown.join(", ")),
        )
    };
    CoherenceCheck {
        name: "account_classes",
        status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(data: &[(&str, Decimal, Decimal)]) -> BalanceSnapshot {
        data.iter().map(|(code, d, c)| (*code, *d, *c)).collect()
    }

    fn coherent() -> BalanceSnapshot {
        snapshot(&[
            ("101", dec!(0), dec!(1000)),
            ("401", dec!(0), dec!(300)),
            ("211", dec!(800), dec!(0)),
            ("521", dec!(700), dec!(0)),
            ("601", dec!(100), dec!(0)),
            ("701", dec!(0), dec!(300)),
        ])
    }

    #[test]
    fn test_coherent_snapshot_passes() {
        let report = run_coherence_checks(&coherent(), "4799", dec!(0.05));

        assert!(report.is_coherent());
        assert!(report.checks.iter().all(|c| c.status == CheckStatus::Passed));
    }

    #[test]
    fn test_balance_sheet_totals() {
        let totals = BalanceSheetTotals::from_snapshot(&coherent());

        assert_eq!(totals.assets, dec!(1500));
        assert_eq!(totals.equity_and_liabilities, dec!(1300));
        assert_eq!(totals.result, dec!(200));
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_class_one_debit_reduces_equity() {
        let totals = BalanceSheetTotals::from_snapshot(&snapshot(&[
            ("101", dec!(0), dec!(1000)),
            ("109", dec!(200), dec!(0)),
            ("521", dec!(800), dec!(0)),
        ]));

        assert_eq!(totals.equity_and_liabilities, dec!(800));
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_suspense_balance_warns() {
        let mut data = coherent();
        data.add("4799", dec!(60), dec!(0));
        data.add("701", dec!(0), dec!(60));

        let report = run_coherence_checks(&data, "4799", dec!(0.05));
        let check = report.check("suspense_account").unwrap();

        assert_eq!(check.status, CheckStatus::Warning);
        assert!(check.message.contains("60"));
        assert!(report.is_coherent());
    }

    #[test]
    fn test_unbalanced_snapshot_fails() {
        let report = run_coherence_checks(&snapshot(&[("521", dec!(10), dec!(0))]), "4799", dec!(0.05));

        assert_eq!(report.check("trial_balance").unwrap().status, CheckStatus::Failed);
        assert!(!report.is_coherent());
    }

    #[test]
    fn test_unknown_class_warns() {
        let report = run_coherence_checks(
            &snapshot(&[("X01", dec!(5), dec!(0)), ("101", dec!(0), dec!(5))]),
            "4799",
            dec!(0.05),
        );
        let check = report.check("account_classes").unwrap();

        assert_eq!(check.status, CheckStatus::Warning);
        assert!(check.message.contains("X01"));
    }
}
