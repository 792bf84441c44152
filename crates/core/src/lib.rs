//! Core business logic for Auditia.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through the [`ledger::LedgerStore`] contract.
//!
//! # Modules
//!
//! - `import` - Trial balance readers and the tolerant balance parser
//! - `ledger` - Double-entry ledger, store contract and import reconciler
//! - `reports` - Mapping rules, template injection and trial balance export
//! - `audit` - Anomaly detection and coherence checks
//! - `syscohada` - Account classes and the reference chart

pub mod audit;
pub mod import;
pub mod ledger;
pub mod reports;
pub mod syscohada;
