//! Per-account balance aggregation.
//!
//! A snapshot is derived from entry lines on demand and never persisted.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Debit and credit totals of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// Total debit.
    pub debit: Decimal,
    /// Total credit.
    pub credit: Decimal,
}

impl AccountTotals {
    /// Net balance (debit − credit). Positive for debit positions.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// `{account code → (debit total, credit total)}` for a company, optionally
/// scoped to one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    accounts: BTreeMap<String, AccountTotals>,
}

impl BalanceSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one line's amounts to an account.
    pub fn add(&mut self, code: &str, debit: Decimal, credit: Decimal) {
        let totals = self.accounts.entry(code.to_string()).or_default();
        totals.debit += debit;
        totals.credit += credit;
    }

    /// Totals of one account.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&AccountTotals> {
        self.accounts.get(code)
    }

    /// Returns true if no account has movements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Iterates accounts in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AccountTotals)> {
        self.accounts.iter().map(|(code, totals)| (code.as_str(), totals))
    }

    /// `{code → debit − credit}` as consumed by the rule engine.
    #[must_use]
    pub fn net_balances(&self) -> BTreeMap<String, Decimal> {
        self.accounts
            .iter()
            .map(|(code, totals)| (code.clone(), totals.net()))
            .collect()
    }

    /// Sum of all debits.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.accounts.values().map(|t| t.debit).sum()
    }

    /// Sum of all credits.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.accounts.values().map(|t| t.credit).sum()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Decimal, Decimal)> for BalanceSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, Decimal, Decimal)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (code, debit, credit) in iter {
            snapshot.add(code.as_ref(), debit, credit);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_add_accumulates_per_code() {
        let snapshot: BalanceSnapshot = [
            ("601", dec!(40), dec!(0)),
            ("701", dec!(0), dec!(100)),
            ("601", dec!(10), dec!(5)),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get("601"),
            Some(&AccountTotals {
                debit: dec!(50),
                credit: dec!(5)
            })
        );
        assert_eq!(snapshot.total_debit(), dec!(50));
        assert_eq!(snapshot.total_credit(), dec!(105));
    }

    #[test]
    fn test_net_balances_sign() {
        let snapshot: BalanceSnapshot = [("2841", dec!(0), dec!(300)), ("211", dec!(1000), dec!(0))]
            .into_iter()
            .collect();
        let nets = snapshot.net_balances();

        assert_eq!(nets.get("2841"), Some(&dec!(-300)));
        assert_eq!(nets.get("211"), Some(&dec!(1000)));
    }

    #[test]
    fn test_iter_is_code_ordered() {
        let snapshot: BalanceSnapshot = [
            ("701", dec!(0), dec!(1)),
            ("101", dec!(0), dec!(1)),
            ("4799", dec!(1), dec!(0)),
        ]
        .into_iter()
        .collect();
        let codes: Vec<&str> = snapshot.iter().map(|(code, _)| code).collect();
        assert_eq!(codes, vec!["101", "4799", "701"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = BalanceSnapshot::new();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_debit(), Decimal::ZERO);
        assert!(snapshot.net_balances().is_empty());
    }
}
