//! Bulk import parsing for sites, tasks, employees and form templates.
//!
//! Field teams hand over whatever their tooling exports: UTF-8 with or
//! without a BOM, Latin-1, comma/semicolon/tab delimited, with header
//! spellings that drift between files. Parsing here is deliberately
//! forgiving about encoding and headers and strict about the values.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use calamine::Reader;
use domain::models::form_template::{derive_field_key, parse_options, FormField};
use domain::models::site::SiteImportRow;

/// Error type for import parsing.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid CSV: {0}")]
    Csv(String),

    #[error("Invalid ZIP archive: {0}")]
    Zip(String),

    #[error("Invalid XLSX workbook: {0}")]
    Xlsx(String),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("The file contains no data rows")]
    Empty,
}

/// Decodes raw upload bytes to text.
///
/// Strips a UTF-8 BOM when present; falls back to Latin-1 when the
/// bytes are not valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Picks the delimiter by counting candidates in the header line.
pub fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let candidates = [b',', b';', b'\t'];
    candidates
        .into_iter()
        .max_by_key(|&d| header.matches(d as char).count())
        .unwrap_or(b',')
}

/// Normalizes a header cell: lowercased, alphanumerics kept, runs of
/// anything else collapsed to a single underscore.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = true;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// A decoded tabular file: normalized headers plus raw row cells.
#[derive(Debug)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of the first header matching any of the given names.
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| names.contains(&h.as_str()))
    }

    /// Cell value for a row, trimmed; empty when the column is absent.
    pub fn cell<'a>(&self, row: &'a [String], column: Option<usize>) -> &'a str {
        column
            .and_then(|i| row.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

/// Parses CSV/TSV bytes into a [`Table`].
pub fn read_table(bytes: &[u8]) -> Result<Table, ImportError> {
    let text = decode_text(bytes);
    let delimiter = sniff_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let headers = match records.next() {
        Some(Ok(record)) => record.iter().map(normalize_header).collect(),
        Some(Err(e)) => return Err(ImportError::Csv(e.to_string())),
        None => return Err(ImportError::Empty),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|e| ImportError::Csv(e.to_string()))?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        // Skip fully blank lines
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(cells);
    }

    Ok(Table { headers, rows })
}

/// Parses a site import file. Rows without a global id are skipped.
pub fn parse_site_rows(bytes: &[u8]) -> Result<Vec<SiteImportRow>, ImportError> {
    let table = read_table(bytes)?;

    let global_id = table
        .column(&["global_id", "globalid", "site_id", "id"])
        .ok_or(ImportError::MissingColumn("global_id"))?;
    let cluster = table.column(&["cluster", "cluster_name"]);
    let site_name = table.column(&["site_name", "sitename", "name", "site"]);
    let latitude = table.column(&["latitude", "lat"]);
    let longitude = table.column(&["longitude", "lon", "lng", "long"]);

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let id = table.cell(row, Some(global_id));
        if id.is_empty() {
            continue;
        }
        rows.push(SiteImportRow {
            global_id: id.to_string(),
            cluster: table.cell(row, cluster).to_string(),
            site_name: table.cell(row, site_name).to_string(),
            latitude: table.cell(row, latitude).parse().ok(),
            longitude: table.cell(row, longitude).parse().ok(),
        });
    }

    if rows.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(rows)
}

/// A raw row from a bulk task assignment file. Values are kept as text
/// so per-row validation can report precise errors.
#[derive(Debug, Clone)]
pub struct TaskCsvRow {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub site_global_id: String,
    pub employee_email: String,
    pub task_name: String,
    pub task_type: String,
    pub description: String,
    pub planned_date: String,
    pub deadline: String,
}

/// Parses a bulk task assignment file.
pub fn parse_task_rows(bytes: &[u8]) -> Result<Vec<TaskCsvRow>, ImportError> {
    let table = read_table(bytes)?;

    let site = table
        .column(&["site_global_id", "site_id", "global_id", "site"])
        .ok_or(ImportError::MissingColumn("site_global_id"))?;
    let email = table
        .column(&["employee_email", "email", "assignee_email", "assignee"])
        .ok_or(ImportError::MissingColumn("employee_email"))?;
    let name = table
        .column(&["task_name", "task", "title"])
        .ok_or(ImportError::MissingColumn("task_name"))?;
    let task_type = table.column(&["task_type", "type"]);
    let description = table.column(&["description", "notes"]);
    let planned = table.column(&["planned_date", "planned", "start_date"]);
    let deadline = table.column(&["deadline", "due_date", "end_date"]);

    let rows: Vec<TaskCsvRow> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| TaskCsvRow {
            row: i + 1,
            site_global_id: table.cell(row, Some(site)).to_string(),
            employee_email: table.cell(row, Some(email)).to_lowercase(),
            task_name: table.cell(row, Some(name)).to_string(),
            task_type: table.cell(row, task_type).to_string(),
            description: table.cell(row, description).to_string(),
            planned_date: table.cell(row, planned).to_string(),
            deadline: table.cell(row, deadline).to_string(),
        })
        .collect();

    if rows.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(rows)
}

/// A raw row from an employee import file.
#[derive(Debug, Clone)]
pub struct EmployeeCsvRow {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub email: String,
    pub name: String,
    pub state: String,
    pub password: String,
    pub company_name: String,
    pub employee_code: String,
    pub mobile_number: String,
}

/// Parses an employee import CSV.
pub fn parse_employee_rows(bytes: &[u8]) -> Result<Vec<EmployeeCsvRow>, ImportError> {
    let table = read_table(bytes)?;

    let email = table
        .column(&["email", "employee_email"])
        .ok_or(ImportError::MissingColumn("email"))?;
    let name = table
        .column(&["name", "employee_name", "full_name"])
        .ok_or(ImportError::MissingColumn("name"))?;
    let state = table
        .column(&["state"])
        .ok_or(ImportError::MissingColumn("state"))?;
    let password = table.column(&["password"]);
    let company = table.column(&["company_name", "company"]);
    let code = table.column(&["employee_code", "emp_code", "code"]);
    let mobile = table.column(&["mobile_number", "mobile", "phone", "phone_number"]);

    let rows: Vec<EmployeeCsvRow> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| EmployeeCsvRow {
            row: i + 1,
            email: table.cell(row, Some(email)).to_lowercase(),
            name: table.cell(row, Some(name)).to_string(),
            state: table.cell(row, Some(state)).to_string(),
            password: table.cell(row, password).to_string(),
            company_name: table.cell(row, company).to_string(),
            employee_code: table.cell(row, code).to_string(),
            mobile_number: table.cell(row, mobile).to_string(),
        })
        .collect();

    if rows.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(rows)
}

/// Which of the two employee photos a ZIP entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotoKind {
    Passport,
    Signature,
}

/// A photo extracted from an employee import ZIP.
#[derive(Debug, Clone)]
pub struct ZipPhoto {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Contents of an employee import ZIP: the CSV rows plus photos keyed
/// by `(email, kind)`.
#[derive(Debug)]
pub struct EmployeeZip {
    pub rows: Vec<EmployeeCsvRow>,
    pub photos: HashMap<(String, PhotoKind), ZipPhoto>,
}

/// Matches a ZIP entry name against the `<email>_passport|signature[.ext]`
/// convention. The match is on the base name, case-insensitive.
pub fn photo_key_for(entry_name: &str) -> Option<(String, PhotoKind)> {
    let base = entry_name.rsplit('/').next()?;
    let stem = match base.rfind('.') {
        Some(i) => &base[..i],
        None => base,
    };
    let stem = stem.to_lowercase();
    if let Some(email) = stem.strip_suffix("_passport") {
        return Some((email.to_string(), PhotoKind::Passport));
    }
    if let Some(email) = stem.strip_suffix("_signature") {
        return Some((email.to_string(), PhotoKind::Signature));
    }
    None
}

/// Parses an employee import ZIP: one `employees.csv` plus photo files.
pub fn parse_employee_zip(bytes: &[u8]) -> Result<EmployeeZip, ImportError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ImportError::Zip(e.to_string()))?;

    let mut csv_bytes: Option<Vec<u8>> = None;
    let mut photos = HashMap::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ImportError::Zip(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let base = name.rsplit('/').next().unwrap_or(&name).to_lowercase();

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| ImportError::Zip(e.to_string()))?;

        if base == "employees.csv" {
            csv_bytes = Some(data);
        } else if let Some(key) = photo_key_for(&name) {
            photos.insert(
                key,
                ZipPhoto {
                    file_name: name.rsplit('/').next().unwrap_or(&name).to_string(),
                    data,
                },
            );
        }
    }

    let csv_bytes = csv_bytes.ok_or(ImportError::MissingColumn("employees.csv"))?;
    let rows = parse_employee_rows(&csv_bytes)?;

    Ok(EmployeeZip { rows, photos })
}

/// Parses a form template CSV into ordered fields.
pub fn parse_form_fields_csv(bytes: &[u8]) -> Result<Vec<FormField>, ImportError> {
    let table = read_table(bytes)?;
    form_fields_from_table(&table)
}

/// Parses the first sheet of a form template XLSX into ordered fields.
pub fn parse_form_fields_xlsx(bytes: &[u8]) -> Result<Vec<FormField>, ImportError> {
    let mut workbook: calamine::Xlsx<_> = calamine::Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Xlsx(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::Empty)?
        .map_err(|e| ImportError::Xlsx(e.to_string()))?;

    let mut iter = range.rows();
    let headers: Vec<String> = match iter.next() {
        Some(row) => row.iter().map(|c| normalize_header(&c.to_string())).collect(),
        None => return Err(ImportError::Empty),
    };

    let rows: Vec<Vec<String>> = iter
        .map(|row| row.iter().map(|c| c.to_string()).collect::<Vec<_>>())
        .filter(|cells: &Vec<String>| !cells.iter().all(|c| c.trim().is_empty()))
        .collect();

    form_fields_from_table(&Table { headers, rows })
}

fn form_fields_from_table(table: &Table) -> Result<Vec<FormField>, ImportError> {
    let label = table
        .column(&["label", "field", "field_label", "question"])
        .ok_or(ImportError::MissingColumn("label"))?;
    let field_type = table.column(&["field_type", "type"]);
    let required = table.column(&["required", "mandatory"]);
    let options = table.column(&["options", "choices"]);
    let order = table.column(&["order", "position"]);

    let mut fields = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let label_value = table.cell(row, Some(label));
        if label_value.is_empty() {
            continue;
        }

        let type_value = table.cell(row, field_type);
        let field_type = if type_value.is_empty() {
            "text".to_string()
        } else {
            type_value.to_lowercase()
        };

        let required = matches!(
            table.cell(row, required).to_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        );

        let order = table
            .cell(row, order)
            .parse::<i32>()
            .unwrap_or((i + 1) as i32);

        fields.push(FormField {
            label: label_value.to_string(),
            key: derive_field_key(label_value),
            field_type,
            required,
            options: parse_options(table.cell(row, options)),
            order,
        });
    }

    if fields.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decode_text_strips_bom() {
        let bytes = [0xEF, 0xBB, 0xBF, b'a', b'b'];
        assert_eq!(decode_text(&bytes), "ab");
    }

    #[test]
    fn test_decode_text_latin1_fallback() {
        // 0xE9 is é in Latin-1 and invalid standalone UTF-8
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_text(&bytes), "café");
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(sniff_delimiter("a\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Site Name"), "site_name");
        assert_eq!(normalize_header("  Global ID  "), "global_id");
        assert_eq!(normalize_header("Latitude (deg)"), "latitude_deg");
    }

    #[test]
    fn test_parse_site_rows_happy_path() {
        let csv = "Global ID,Cluster,Site Name,Latitude,Longitude\n\
                   IN-HYD-0042,Hyderabad West,Gachibowli Tower,17.44,78.35\n\
                   IN-HYD-0043,Hyderabad West,Kondapur Hub,,\n";
        let rows = parse_site_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].global_id, "IN-HYD-0042");
        assert_eq!(rows[0].latitude, Some(17.44));
        assert!(rows[1].latitude.is_none());
    }

    #[test]
    fn test_parse_site_rows_semicolon_delimited() {
        let csv = "global_id;cluster;site_name\nG1;C1;S1\n";
        let rows = parse_site_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cluster, "C1");
    }

    #[test]
    fn test_parse_site_rows_skips_blank_ids() {
        let csv = "global_id,cluster,site_name\n,C1,S1\nG2,C2,S2\n";
        let rows = parse_site_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].global_id, "G2");
    }

    #[test]
    fn test_parse_site_rows_missing_id_column() {
        let csv = "cluster,site_name\nC1,S1\n";
        let err = parse_site_rows(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("global_id")));
    }

    #[test]
    fn test_parse_task_rows() {
        let csv = "Site Global ID,Employee Email,Task Name,Task Type,Planned Date,Deadline\n\
                   G1,Tech@Example.com,DG PM,preventive,05-03-24,2024-03-20\n";
        let rows = parse_task_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].employee_email, "tech@example.com");
        assert_eq!(rows[0].planned_date, "05-03-24");
    }

    #[test]
    fn test_parse_employee_rows() {
        let csv = "Email,Name,State,Password,Company Name,Mobile Number\n\
                   a@b.com,Asha,Telangana,Secret#123,Acme,9876543210\n";
        let rows = parse_employee_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].email, "a@b.com");
        assert_eq!(rows[0].company_name, "Acme");
    }

    #[test]
    fn test_photo_key_for() {
        assert_eq!(
            photo_key_for("photos/a@b.com_passport.jpg"),
            Some(("a@b.com".to_string(), PhotoKind::Passport))
        );
        assert_eq!(
            photo_key_for("A@B.com_Signature.PNG"),
            Some(("a@b.com".to_string(), PhotoKind::Signature))
        );
        assert_eq!(photo_key_for("readme.txt"), None);
    }

    #[test]
    fn test_parse_employee_zip() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::FileOptions::default();
            writer.start_file("employees.csv", options).unwrap();
            writer
                .write_all(b"email,name,state,password\na@b.com,Asha,Telangana,Secret#123\n")
                .unwrap();
            writer.start_file("a@b.com_passport.jpg", options).unwrap();
            writer.write_all(b"jpegdata").unwrap();
            writer.finish().unwrap();
        }

        let archive = parse_employee_zip(buffer.get_ref()).unwrap();
        assert_eq!(archive.rows.len(), 1);
        let photo = archive
            .photos
            .get(&("a@b.com".to_string(), PhotoKind::Passport))
            .unwrap();
        assert_eq!(photo.data, b"jpegdata");
        assert!(archive
            .photos
            .get(&("a@b.com".to_string(), PhotoKind::Signature))
            .is_none());
    }

    #[test]
    fn test_parse_employee_zip_without_csv() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::FileOptions::default();
            writer.start_file("readme.txt", options).unwrap();
            writer.write_all(b"hello").unwrap();
            writer.finish().unwrap();
        }
        assert!(parse_employee_zip(buffer.get_ref()).is_err());
    }

    #[test]
    fn test_parse_form_fields_csv() {
        let csv = "Label,Type,Required,Options,Order\n\
                   Engine Oil Level,select,yes,\"OK, Low, Critical\",1\n\
                   Remarks,text,no,,2\n";
        let fields = parse_form_fields_csv(csv.as_bytes()).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].key, "engine_oil_level");
        assert!(fields[0].required);
        assert_eq!(fields[0].options, vec!["OK", "Low", "Critical"]);
        assert_eq!(fields[1].field_type, "text");
        assert!(!fields[1].required);
    }

    #[test]
    fn test_parse_form_fields_defaults_order_to_position() {
        let csv = "Label\nFirst\nSecond\n";
        let fields = parse_form_fields_csv(csv.as_bytes()).unwrap();
        assert_eq!(fields[0].order, 1);
        assert_eq!(fields[1].order, 2);
    }
}
