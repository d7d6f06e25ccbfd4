//! Form template models.
//!
//! Each task group carries one active form template. Templates are
//! uploaded as CSV or XLSX and stored as an ordered field list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group of tasks sharing a report form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskGroup {
    Dg,
    Ac,
    SiteVisit,
}

impl TaskGroup {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskGroup::Dg => "dg",
            TaskGroup::Ac => "ac",
            TaskGroup::SiteVisit => "site_visit",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dg" => Some(TaskGroup::Dg),
            "ac" => Some(TaskGroup::Ac),
            "site_visit" => Some(TaskGroup::SiteVisit),
            _ => None,
        }
    }

    /// Maps a task title to its form group.
    pub fn for_task_title(title: &str) -> Option<Self> {
        let title = title.to_lowercase();
        if title.starts_with("dg") {
            Some(TaskGroup::Dg)
        } else if title.starts_with("ac") {
            Some(TaskGroup::Ac)
        } else if title.contains("site visit") {
            Some(TaskGroup::SiteVisit)
        } else {
            None
        }
    }
}

/// A single field in a form template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub label: String,
    pub field_type: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub order: i32,
    pub key: String,
}

/// Stored form template for a task group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTemplate {
    pub id: i64,
    pub task_group: TaskGroup,
    pub fields: Vec<FormField>,
    pub updated_at: DateTime<Utc>,
}

/// Derives a stable answer key from a field label: lowercased, with
/// whitespace runs collapsed to underscores and punctuation dropped.
pub fn derive_field_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    let mut last_was_sep = true;
    for c in label.trim().chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            key.push('_');
            last_was_sep = true;
        }
    }
    while key.ends_with('_') {
        key.pop();
    }
    key
}

/// Splits a raw comma-separated options cell into trimmed options.
pub fn parse_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_group_round_trip() {
        for group in [TaskGroup::Dg, TaskGroup::Ac, TaskGroup::SiteVisit] {
            assert_eq!(TaskGroup::parse(group.as_str()), Some(group));
        }
        assert_eq!(TaskGroup::parse("hvac"), None);
    }

    #[test]
    fn test_task_group_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskGroup::SiteVisit).unwrap(),
            "\"site_visit\""
        );
    }

    #[test]
    fn test_group_for_task_title() {
        assert_eq!(TaskGroup::for_task_title("DG PM"), Some(TaskGroup::Dg));
        assert_eq!(TaskGroup::for_task_title("DG CM"), Some(TaskGroup::Dg));
        assert_eq!(TaskGroup::for_task_title("AC CM"), Some(TaskGroup::Ac));
        assert_eq!(
            TaskGroup::for_task_title("Site Visit"),
            Some(TaskGroup::SiteVisit)
        );
        assert_eq!(TaskGroup::for_task_title("Painting"), None);
    }

    #[test]
    fn test_derive_field_key() {
        assert_eq!(derive_field_key("Engine Oil Level"), "engine_oil_level");
        assert_eq!(derive_field_key("  Battery Voltage (V) "), "battery_voltage_v");
        assert_eq!(derive_field_key("OK?"), "ok");
        assert_eq!(derive_field_key("Remarks"), "remarks");
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(parse_options("Yes, No , N/A"), vec!["Yes", "No", "N/A"]);
        assert!(parse_options("").is_empty());
        assert!(parse_options(" , ,").is_empty());
    }

    #[test]
    fn test_form_field_serialization_skips_empty_options() {
        let field = FormField {
            label: "Remarks".to_string(),
            field_type: "text".to_string(),
            required: false,
            options: vec![],
            order: 3,
            key: "remarks".to_string(),
        };
        let json = serde_json::to_string(&field).unwrap();
        assert!(!json.contains("options"));
        assert!(json.contains("\"fieldType\":\"text\""));
    }
}
