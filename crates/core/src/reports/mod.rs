//! Statutory report generation.
//!
//! This module turns ledger balances into filled statement templates:
//! - Rule engine evaluating account-prefix rules
//! - Mapping configuration tying template cells to rules
//! - Report template records and prerequisite checks
//! - Template injection at the workbook-archive level
//! - Trial balance (balance générale) export

pub mod error;
pub mod injector;
pub mod mapping;
pub mod rule;
pub mod template;
pub mod trial_balance;
pub mod xlsx;

#[cfg(test)]
mod rule_props;

pub use error::ReportError;
pub use injector::{InjectionLogEntry, InjectionReport, TemplateInjector};
pub use mapping::{CellAddress, MappingEntry, MappingError, RejectedEntry, ReportMapping};
pub use rule::{Matcher, MappingRule, Pattern, RuleError, evaluate};
pub use template::{ReportTemplate, missing_sheets};
pub use trial_balance::{TrialBalance, TrialBalanceRow, TrialBalanceTotals};
