//! Double-entry ledger.
//!
//! This module implements the bookkeeping side of a balance import:
//! - Domain types for accounts, journals, documents and entries
//! - Entry validation (non-empty, non-negative, balanced)
//! - The `LedgerStore` contract and an in-memory implementation
//! - Balance snapshots derived from entry lines
//! - The reconciler booking parsed balances as one entry

pub mod error;
pub mod memory;
pub mod reconciler;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod reconciler_props;
#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use memory::MemoryLedgerStore;
pub use reconciler::{ImportResult, Reconciler, ReconcilerConfig};
pub use snapshot::{AccountTotals, BalanceSnapshot};
pub use store::LedgerStore;
pub use types::{
    Account, Document, DocumentKind, Entry, EntryLine, Journal, NewAccount, NewDocument,
    NewEntry, NewEntryLine,
};
pub use validation::validate_entry;
