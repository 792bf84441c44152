//! Report templates.

use std::path::Path;

use auditia_shared::types::TemplateId;
use calamine::{Reader, open_workbook_auto};
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use super::mapping::{MappingError, ReportMapping};

/// A statutory statement template and its cell mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTemplate {
    /// Template ID.
    pub id: TemplateId,
    /// Display name (e.g. "Liasse fiscale SYSCOHADA").
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// ISO country code the layout is published for.
    pub country: String,
    /// Fiscal year the layout applies to.
    pub year: i32,
    /// Workbook location.
    pub file_path: String,
    /// JSON object of `"Sheet!Cell": "rule"` pairs.
    pub mapping_config: String,
}

impl ReportTemplate {
    /// Parses the stored mapping configuration.
    pub fn mapping(&self) -> Result<ReportMapping, MappingError> {
        ReportMapping::from_json(&self.mapping_config)
    }
}

/// Returns the required sheets a template workbook does not contain.
///
/// Names are compared exactly, as mapping keys are.
pub fn missing_sheets(path: &Path, required: &[String]) -> Result<Vec<String>, ReportError> {
    if !path.exists() {
        return Err(ReportError::TemplateNotFound(path.to_path_buf()));
    }
    let workbook = open_workbook_auto(path).map_err(|e| ReportError::Spreadsheet(e.to_string()))?;
    let present = workbook.sheet_names();

    Ok(required
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .cloned()
        .collect())
}
