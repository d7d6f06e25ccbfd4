//! Form template endpoints.

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use domain::models::form_template::{FormTemplate, TaskGroup};
use persistence::repositories::FormTemplateRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::read_upload;
use crate::services::imports;
use crate::services::report_export::timestamped_filename;

fn parse_group(raw: &str) -> Result<TaskGroup, ApiError> {
    TaskGroup::parse(raw)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown form group: {}", raw)))
}

/// GET /api/v1/panel/forms/:group
pub async fn get_template(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<FormTemplate>, ApiError> {
    let group = parse_group(&group)?;

    let templates = FormTemplateRepository::new(state.pool.clone());
    let entity = templates
        .find_by_group(group)
        .await?
        .ok_or_else(|| ApiError::NotFound("No form template uploaded for this group".into()))?;

    Ok(Json(FormTemplate::from(entity)))
}

/// POST /api/v1/panel/forms/:group
///
/// Replaces the group's template with the uploaded CSV or XLSX field
/// list. The file format is picked by extension.
pub async fn upload_template(
    State(state): State<AppState>,
    Path(group): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<FormTemplate>, ApiError> {
    let group = parse_group(&group)?;
    let (file_name, bytes) = read_upload(&mut multipart).await?;

    let lower = file_name.to_lowercase();
    let fields = if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        imports::parse_form_fields_xlsx(&bytes)
    } else {
        imports::parse_form_fields_csv(&bytes)
    }
    .map_err(|e| ApiError::Validation(format!("Invalid form file: {}", e)))?;

    if fields.is_empty() {
        return Err(ApiError::Validation("Form file contains no fields".into()));
    }

    let schema = serde_json::to_value(&fields)
        .map_err(|e| ApiError::Internal(format!("Failed to encode template: {}", e)))?;

    let templates = FormTemplateRepository::new(state.pool.clone());
    let entity = templates.upsert(group, &schema).await?;

    tracing::info!(group = group.as_str(), fields = fields.len(), file = %file_name, "Form template updated");
    Ok(Json(FormTemplate::from(entity)))
}

/// GET /api/v1/panel/forms/:group/export
pub async fn export_template(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Response, ApiError> {
    let group = parse_group(&group)?;

    let templates = FormTemplateRepository::new(state.pool.clone());
    let entity = templates
        .find_by_group(group)
        .await?
        .ok_or_else(|| ApiError::NotFound("No form template uploaded for this group".into()))?;
    let template = FormTemplate::from(entity);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["label", "type", "required", "options", "order"])
        .map_err(|e| ApiError::Internal(format!("Failed to render CSV: {}", e)))?;
    for field in &template.fields {
        writer
            .write_record([
                field.label.as_str(),
                field.field_type.as_str(),
                if field.required { "yes" } else { "no" },
                &field.options.join(", "),
                &field.order.to_string(),
            ])
            .map_err(|e| ApiError::Internal(format!("Failed to render CSV: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("Failed to render CSV: {}", e)))?;

    let file_name = timestamped_filename(&format!("form_{}", group.as_str()), "csv");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_accepts_known_groups() {
        assert!(parse_group("dg").is_ok());
        assert!(parse_group("ac").is_ok());
        assert!(parse_group("site_visit").is_ok());
    }

    #[test]
    fn test_parse_group_rejects_unknown() {
        assert!(matches!(parse_group("hvac"), Err(ApiError::NotFound(_))));
    }
}
