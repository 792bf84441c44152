//! Audit service over a ledger store.

use auditia_shared::config::LedgerConfig;
use auditia_shared::types::{CompanyId, DocumentId};
use rust_decimal::Decimal;
use tracing::info;

use super::anomalies::{Anomaly, detect_anomalies};
use super::coherence::{CoherenceReport, run_coherence_checks};
use crate::ledger::{LedgerError, LedgerStore};

/// Runs read-only audits against a company's ledger.
pub struct AuditService<'a> {
    store: &'a dyn LedgerStore,
    suspense_code: String,
    tolerance: Decimal,
}

impl<'a> AuditService<'a> {
    /// Creates a service using the ledger settings.
    #[must_use]
    pub fn new(store: &'a dyn LedgerStore, config: &LedgerConfig) -> Self {
        Self {
            store,
            suspense_code: config.suspense_account_code.clone(),
            tolerance: config.entry_tolerance,
        }
    }

    /// Scans every committed entry of the company.
    pub async fn anomalies(&self, company_id: CompanyId) -> Result<Vec<Anomaly>, LedgerError> {
        let entries = self.store.list_entries(company_id).await?;
        let anomalies = detect_anomalies(&entries);
        info!(%company_id, entries = entries.len(), anomalies = anomalies.len(), "anomaly scan complete");
        Ok(anomalies)
    }

    /// Runs the coherence checks, optionally scoped to one imported document.
    pub async fn coherence(
        &self,
        company_id: CompanyId,
        document_id: Option<DocumentId>,
    ) -> Result<CoherenceReport, LedgerError> {
        let snapshot = self.store.balance_snapshot(company_id, document_id).await?;
        let report = run_coherence_checks(&snapshot, &self.suspense_code, self.tolerance);
        info!(%company_id, coherent = report.is_coherent(), "coherence checks complete");
        Ok(report)
    }
}
