//! Report error types.

use std::path::PathBuf;

use auditia_shared::AppError;
use thiserror::Error;

use super::mapping::MappingError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No ledger data to report.
    #[error("No balances to report: the ledger is empty")]
    EmptyBalance,

    /// Template file is missing.
    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// Mapping configuration cannot be loaded.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Workbook archive cannot be read or written.
    #[error("Workbook archive error: {0}")]
    Zip(String),

    /// Workbook part is not valid XML.
    #[error("Workbook XML error: {0}")]
    Xml(String),

    /// Spreadsheet could not be read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// CSV export failed.
    #[error("CSV error: {0}")]
    Csv(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyBalance => "EMPTY_BALANCE",
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::Mapping(err) => err.error_code(),
            Self::Zip(_) => "WORKBOOK_ARCHIVE_ERROR",
            Self::Xml(_) => "WORKBOOK_XML_ERROR",
            Self::Spreadsheet(_) => "SPREADSHEET_ERROR",
            Self::Csv(_) => "CSV_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Mapping(_) => 400,
            Self::TemplateNotFound(_) => 404,
            Self::EmptyBalance => 422,
            Self::Zip(_) | Self::Xml(_) | Self::Spreadsheet(_) | Self::Csv(_) | Self::Io(_) => 500,
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<zip::result::ZipError> for ReportError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Zip(err.to_string())
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::EmptyBalance => Self::BusinessRule(err.to_string()),
            ReportError::TemplateNotFound(_) => Self::NotFound(err.to_string()),
            ReportError::Mapping(_) => Self::Validation(err.to_string()),
            ReportError::Io(msg) => Self::Io(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
