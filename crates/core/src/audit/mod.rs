//! Ledger audits.
//!
//! Read-only analyses of committed data:
//! - Anomaly detection on entries
//! - Coherence checks on balance snapshots

pub mod anomalies;
pub mod coherence;
pub mod service;

pub use anomalies::{Anomaly, AnomalyKind, Severity, detect_anomalies};
pub use coherence::{
    BalanceSheetTotals, CheckStatus, CoherenceCheck, CoherenceReport, run_coherence_checks,
};
pub use service::AuditService;
