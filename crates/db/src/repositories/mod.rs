//! Repository implementations for data access.

pub mod ledger;
pub mod report_template;

pub use ledger::SeaLedgerStore;
pub use report_template::{CreateReportTemplate, ReportTemplateError, ReportTemplateRepository};
