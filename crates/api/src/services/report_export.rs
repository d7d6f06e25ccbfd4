//! Report export rendering: CSV and PDF.

use chrono::Utc;
use domain::models::report::ReportDetail;
use printpdf::{BuiltinFont, Mm, PdfDocument};

/// Error type for export rendering.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to render CSV: {0}")]
    Csv(String),

    #[error("Failed to render PDF: {0}")]
    Pdf(String),
}

/// File name with a UTC timestamp, e.g. `report_T100042_20240305_141530.csv`.
pub fn timestamped_filename(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        Utc::now().format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Metadata rows shared by both export formats: (label, value).
fn metadata_rows(detail: &ReportDetail) -> Vec<(String, String)> {
    let mut rows = vec![
        ("Task Code".to_string(), detail.task_code.clone()),
        ("Task".to_string(), detail.task_title.clone()),
        ("Site ID".to_string(), detail.site_global_id.clone()),
        ("Site".to_string(), detail.site_name.clone()),
        (
            "Employee".to_string(),
            format!("{} <{}>", detail.employee_name, detail.employee_email),
        ),
        ("Status".to_string(), detail.status.as_str().to_string()),
        (
            "Submitted".to_string(),
            detail.submitted_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        ),
    ];
    if let Some(approved_at) = detail.approved_at {
        rows.push((
            "Approved".to_string(),
            approved_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        ));
    }
    if let Some(reason) = &detail.rejection_reason {
        rows.push(("Rejection Reason".to_string(), reason.clone()));
    }
    rows
}

/// Answer rows: (label, value) from the JSON answers object.
fn answer_rows(detail: &ReportDetail) -> Vec<(String, String)> {
    match detail.answers.as_object() {
        Some(map) => map
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key.clone(), rendered)
            })
            .collect(),
        None => vec![],
    }
}

/// Renders a report as CSV: a metadata header, then one row per answer,
/// then one row per attached file.
pub fn report_csv(detail: &ReportDetail) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let write =
        |writer: &mut csv::Writer<Vec<u8>>, record: &[&str]| -> Result<(), ExportError> {
            writer
                .write_record(record)
                .map_err(|e| ExportError::Csv(e.to_string()))
        };

    write(&mut writer, &["Section", "Label", "Value"])?;
    for (label, value) in metadata_rows(detail) {
        write(&mut writer, &["Report", &label, &value])?;
    }
    for (label, value) in answer_rows(detail) {
        write(&mut writer, &["Answers", &label, &value])?;
    }
    for file in &detail.files {
        write(&mut writer, &["Files", &file.label, &file.url])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 7.0;

/// Renders a report as a single-column PDF: title, metadata block, then
/// section/label/value rows. Long reports flow onto additional pages.
pub fn report_pdf(detail: &ReportDetail) -> Result<Vec<u8>, ExportError> {
    let title = format!("Field Report {}", detail.task_code);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut layer_ref = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    let mut next_line = |doc: &printpdf::PdfDocumentReference,
                         layer_ref: &mut printpdf::PdfLayerReference,
                         y: &mut f32| {
        *y -= LINE_HEIGHT_MM;
        if *y < MARGIN_MM {
            let (new_page, new_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            *layer_ref = doc.get_page(new_page).get_layer(new_layer);
            *y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    };

    layer_ref.use_text(&title, 16.0, Mm(MARGIN_MM), Mm(y), &bold);
    next_line(&doc, &mut layer_ref, &mut y);
    next_line(&doc, &mut layer_ref, &mut y);

    for (label, value) in metadata_rows(detail) {
        layer_ref.use_text(format!("{}:", label), 10.0, Mm(MARGIN_MM), Mm(y), &bold);
        layer_ref.use_text(value, 10.0, Mm(MARGIN_MM + 50.0), Mm(y), &regular);
        next_line(&doc, &mut layer_ref, &mut y);
    }

    next_line(&doc, &mut layer_ref, &mut y);
    layer_ref.use_text("Answers", 12.0, Mm(MARGIN_MM), Mm(y), &bold);
    next_line(&doc, &mut layer_ref, &mut y);

    for (label, value) in answer_rows(detail) {
        layer_ref.use_text(format!("{}:", label), 10.0, Mm(MARGIN_MM), Mm(y), &bold);
        layer_ref.use_text(value, 10.0, Mm(MARGIN_MM + 70.0), Mm(y), &regular);
        next_line(&doc, &mut layer_ref, &mut y);
    }

    if !detail.files.is_empty() {
        next_line(&doc, &mut layer_ref, &mut y);
        layer_ref.use_text("Attachments", 12.0, Mm(MARGIN_MM), Mm(y), &bold);
        next_line(&doc, &mut layer_ref, &mut y);
        for file in &detail.files {
            layer_ref.use_text(
                format!("{}: {}", file.label, file.url),
                10.0,
                Mm(MARGIN_MM),
                Mm(y),
                &regular,
            );
            next_line(&doc, &mut layer_ref, &mut y);
        }
    }

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::report::{ReportFileView, ReportStatus};
    use uuid::Uuid;

    fn sample_detail() -> ReportDetail {
        ReportDetail {
            id: Uuid::new_v4(),
            task_code: "T100042".to_string(),
            task_title: "DG PM".to_string(),
            site_global_id: "IN-HYD-0042".to_string(),
            site_name: "Gachibowli Tower".to_string(),
            employee_email: "tech@example.com".to_string(),
            employee_name: "Asha".to_string(),
            status: ReportStatus::Approved,
            rejection_reason: None,
            answers: serde_json::json!({
                "engine_oil_level": "OK",
                "battery_voltage_v": 12.6,
            }),
            files: vec![ReportFileView {
                label: "Engine photo".to_string(),
                url: "/media/reports/abc.jpg".to_string(),
            }],
            submitted_at: Utc::now(),
            approved_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_report_csv_includes_all_sections() {
        let bytes = report_csv(&sample_detail()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Report,Task Code,T100042"));
        assert!(text.contains("Answers,engine_oil_level,OK"));
        assert!(text.contains("Answers,battery_voltage_v,12.6"));
        assert!(text.contains("Files,Engine photo,/media/reports/abc.jpg"));
    }

    #[test]
    fn test_report_csv_includes_rejection_reason() {
        let mut detail = sample_detail();
        detail.status = ReportStatus::Rejected;
        detail.approved_at = None;
        detail.rejection_reason = Some("photos missing".to_string());

        let text = String::from_utf8(report_csv(&detail).unwrap()).unwrap();
        assert!(text.contains("Rejection Reason,photos missing"));
        assert!(!text.contains("Approved,"));
    }

    #[test]
    fn test_report_pdf_renders_nonempty_document() {
        let bytes = report_pdf(&sample_detail()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_report_pdf_handles_many_answers_across_pages() {
        let mut detail = sample_detail();
        let mut map = serde_json::Map::new();
        for i in 0..120 {
            map.insert(
                format!("check_{:03}", i),
                serde_json::Value::String("OK".to_string()),
            );
        }
        detail.answers = serde_json::Value::Object(map);
        let bytes = report_pdf(&detail).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_timestamped_filename_shape() {
        let name = timestamped_filename("report_T100042", "csv");
        assert!(name.starts_with("report_T100042_"));
        assert!(name.ends_with(".csv"));
    }
}
