//! Balance import error types.

use auditia_shared::AppError;
use thiserror::Error;

/// Errors that can occur while reading or parsing a trial balance.
#[derive(Debug, Error)]
pub enum ImportError {
    /// No column could be identified as the account code.
    #[error("No account column found (columns: {})", columns.join(", "))]
    MissingAccountColumn {
        /// Column names seen in the header, or positional labels.
        columns: Vec<String>,
    },

    /// The file extension is not a supported tabular format.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The workbook has no worksheet.
    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    /// Spreadsheet could not be read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Delimited text could not be read.
    #[error("CSV error: {0}")]
    Csv(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ImportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingAccountColumn { .. } => "MISSING_ACCOUNT_COLUMN",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::EmptyWorkbook => "EMPTY_WORKBOOK",
            Self::Spreadsheet(_) => "SPREADSHEET_ERROR",
            Self::Csv(_) => "CSV_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingAccountColumn { .. }
            | Self::UnsupportedFormat(_)
            | Self::EmptyWorkbook
            | Self::Spreadsheet(_)
            | Self::Csv(_) => 400,
            Self::Io(_) => 500,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Io(msg) => Self::Io(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_account_column_display() {
        let err = ImportError::MissingAccountColumn {
            columns: vec!["Libellé".to_string(), "Débit".to_string()],
        };
        assert_eq!(err.to_string(), "No account column found (columns: Libellé, Débit)");
        assert_eq!(err.error_code(), "MISSING_ACCOUNT_COLUMN");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = ImportError::UnsupportedFormat("pdf".to_string()).into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");

        let app: AppError = ImportError::Io("denied".to_string()).into();
        assert_eq!(app.status_code(), 500);
    }
}
