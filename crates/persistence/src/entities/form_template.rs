//! Form template entity.

use chrono::{DateTime, Utc};
use domain::models::form_template::{FormField, FormTemplate, TaskGroup};
use sqlx::FromRow;

/// Row of the `form_templates` table. The field list is stored as a
/// JSONB array in `schema`.
#[derive(Debug, Clone, FromRow)]
pub struct FormTemplateEntity {
    pub id: i64,
    pub task_group: String,
    pub schema: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl From<FormTemplateEntity> for FormTemplate {
    fn from(e: FormTemplateEntity) -> Self {
        let fields: Vec<FormField> = serde_json::from_value(e.schema).unwrap_or_default();
        FormTemplate {
            id: e.id,
            task_group: TaskGroup::parse(&e.task_group).unwrap_or(TaskGroup::SiteVisit),
            fields,
            updated_at: e.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_from_entity() {
        let entity = FormTemplateEntity {
            id: 1,
            task_group: "dg".to_string(),
            schema: serde_json::json!([{
                "label": "Engine Oil Level",
                "fieldType": "select",
                "required": true,
                "options": ["OK", "Low"],
                "order": 1,
                "key": "engine_oil_level"
            }]),
            updated_at: Utc::now(),
        };
        let template = FormTemplate::from(entity);
        assert_eq!(template.task_group, TaskGroup::Dg);
        assert_eq!(template.fields.len(), 1);
        assert_eq!(template.fields[0].key, "engine_oil_level");
        assert_eq!(template.fields[0].options, vec!["OK", "Low"]);
    }

    #[test]
    fn test_malformed_schema_yields_no_fields() {
        let entity = FormTemplateEntity {
            id: 1,
            task_group: "ac".to_string(),
            schema: serde_json::json!({"not": "an array"}),
            updated_at: Utc::now(),
        };
        assert!(FormTemplate::from(entity).fields.is_empty());
    }
}
