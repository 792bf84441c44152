//! Business rule validation for entries before they are committed.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::NewEntry;

/// Validates the entry invariant: at least one line, non-negative amounts,
/// and |Σdebit − Σcredit| within `tolerance`.
///
/// # Errors
///
/// Returns an error if the entry violates one of these rules.
pub fn validate_entry(entry: &NewEntry, tolerance: Decimal) -> Result<(), LedgerError> {
    if entry.lines.is_empty() {
        return Err(LedgerError::EmptyEntry);
    }

    if entry
        .lines
        .iter()
        .any(|line| line.debit < Decimal::ZERO || line.credit < Decimal::ZERO)
    {
        return Err(LedgerError::NegativeAmount);
    }

    let (debit, credit) = entry.totals();
    if (debit - credit).abs() > tolerance {
        return Err(LedgerError::UnbalancedEntry { debit, credit });
    }

    Ok(())
}
