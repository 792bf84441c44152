//! Report template repository.

use auditia_core::reports::{MappingError, ReportMapping, ReportTemplate};
use auditia_shared::AppError;
use auditia_shared::types::TemplateId;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::report_templates;

/// Error types for report template operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportTemplateError {
    /// Template not found.
    #[error("Report template not found: {0}")]
    NotFound(TemplateId),

    /// Mapping configuration is not a JSON object.
    #[error(transparent)]
    InvalidMapping(#[from] MappingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReportTemplateError> for AppError {
    fn from(err: ReportTemplateError) -> Self {
        match err {
            ReportTemplateError::NotFound(_) => Self::NotFound(err.to_string()),
            ReportTemplateError::InvalidMapping(_) => Self::Validation(err.to_string()),
            ReportTemplateError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for registering a template.
#[derive(Debug, Clone)]
pub struct CreateReportTemplate {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// ISO country code.
    pub country: String,
    /// Fiscal year of the layout.
    pub year: i32,
    /// Workbook location.
    pub file_path: String,
    /// JSON mapping configuration, stored verbatim.
    pub mapping_config: String,
}

fn template_from_model(model: report_templates::Model) -> ReportTemplate {
    ReportTemplate {
        id: model.id.into(),
        name: model.name,
        description: model.description,
        country: model.country,
        year: model.year,
        file_path: model.file_path,
        mapping_config: model.mapping_config,
    }
}

/// Report template repository.
#[derive(Debug, Clone)]
pub struct ReportTemplateRepository {
    db: DatabaseConnection,
}

impl ReportTemplateRepository {
    /// Creates a new report template repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a template.
    ///
    /// The mapping must be a JSON object. Individual malformed cells or rules
    /// are accepted here and reported by the injector.
    pub async fn create(
        &self,
        input: CreateReportTemplate,
    ) -> Result<ReportTemplate, ReportTemplateError> {
        let mapping = ReportMapping::from_json(&input.mapping_config)?;

        let model = report_templates::ActiveModel {
            id: Set(TemplateId::new().into_inner()),
            name: Set(input.name),
            description: Set(input.description),
            country: Set(input.country),
            year: Set(input.year),
            file_path: Set(input.file_path),
            mapping_config: Set(input.mapping_config),
            created_at: Set(Utc::now().fixed_offset()),
        };
        let created = model.insert(&self.db).await?;

        info!(
            template_id = %created.id,
            name = %created.name,
            cells = mapping.len(),
            rejected = mapping.rejected.len(),
            "Report template registered"
        );
        Ok(template_from_model(created))
    }

    /// Finds a template by ID.
    pub async fn find_by_id(
        &self,
        id: TemplateId,
    ) -> Result<Option<ReportTemplate>, ReportTemplateError> {
        let model = report_templates::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        Ok(model.map(template_from_model))
    }

    /// Gets a template by ID, failing if it does not exist.
    pub async fn get(&self, id: TemplateId) -> Result<ReportTemplate, ReportTemplateError> {
        self.find_by_id(id)
            .await?
            .ok_or(ReportTemplateError::NotFound(id))
    }

    /// Lists templates, optionally for one country, newest year first.
    pub async fn list(
        &self,
        country: Option<&str>,
    ) -> Result<Vec<ReportTemplate>, ReportTemplateError> {
        let mut query = report_templates::Entity::find();
        if let Some(country) = country {
            query = query.filter(report_templates::Column::Country.eq(country));
        }
        let models = query
            .order_by_asc(report_templates::Column::Country)
            .order_by_desc(report_templates::Column::Year)
            .order_by_asc(report_templates::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(template_from_model).collect())
    }

    /// Deletes a template. Returns false if it did not exist.
    pub async fn delete(&self, id: TemplateId) -> Result<bool, ReportTemplateError> {
        let result = report_templates::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
