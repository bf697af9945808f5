//! Export formatting for firm records.
//!
//! One `flatten_record` pass produces the field sequence every format
//! shares; CSV, XLSX, PDF and JSON all serialize the identical field set in
//! the identical order. Exporting an empty record list produces no artifact.

use crate::errors::AppError;
use crate::models::{FirmOutput, FirmRecord};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Delimiter used when an array-valued field is collapsed into one cell.
pub const ARRAY_JOIN: &str = "; ";

/// Flattened field order, shared by every export format.
pub const FLATTENED_FIELDS: [&str; 23] = [
    "firm_name",
    "website_url",
    "owner_name",
    "owner_phone",
    "owner_email",
    "city",
    "state",
    "vacant_listings_count",
    "doors_managed",
    "property_management_software",
    "leasing_manager_name",
    "leasing_manager_contact",
    "services_offered",
    "portfolio_focus",
    "google_reviews_count",
    "google_rating",
    "last_blog_update",
    "linkedin_url",
    "instagram_url",
    "facebook_url",
    "advertises_24_7_maintenance",
    "advertises_tenant_portal",
    "is_hiring",
];

/// One flattened cell. Absent source fields flatten to `Empty` and render
/// as an empty cell in text formats.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl FlatValue {
    /// Textual rendering used by the CSV and PDF writers.
    pub fn as_cell(&self) -> String {
        match self {
            FlatValue::Text(s) => s.clone(),
            FlatValue::Number(n) => n.to_string(),
            FlatValue::Bool(b) => b.to_string(),
            FlatValue::Empty => String::new(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FlatValue::Text(s) => Value::String(s.clone()),
            FlatValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FlatValue::Bool(b) => Value::Bool(*b),
            FlatValue::Empty => Value::Null,
        }
    }
}

fn text(v: &Option<String>) -> FlatValue {
    match v {
        Some(s) => FlatValue::Text(s.clone()),
        None => FlatValue::Empty,
    }
}

fn number(v: &Option<f64>) -> FlatValue {
    match v {
        Some(n) => FlatValue::Number(*n),
        None => FlatValue::Empty,
    }
}

fn boolean(v: &Option<bool>) -> FlatValue {
    match v {
        Some(b) => FlatValue::Bool(*b),
        None => FlatValue::Empty,
    }
}

fn joined(v: &Option<Vec<String>>) -> FlatValue {
    match v {
        Some(items) => FlatValue::Text(items.join(ARRAY_JOIN)),
        None => FlatValue::Empty,
    }
}

/// Flattens a firm record into one row of scalar cells, in
/// [`FLATTENED_FIELDS`] order.
pub fn flatten_record(record: &FirmRecord) -> Vec<FlatValue> {
    let o: &FirmOutput = &record.output;
    vec![
        text(&o.firm_name),
        text(&o.website_url),
        text(&o.owner_name),
        text(&o.owner_phone),
        text(&o.owner_email),
        text(&o.city),
        text(&o.state),
        number(&o.vacant_listings_count),
        text(&o.doors_managed),
        text(&o.property_management_software),
        text(&o.leasing_manager_name),
        text(&o.leasing_manager_contact),
        joined(&o.services_offered),
        joined(&o.portfolio_focus),
        number(&o.google_reviews_count),
        number(&o.google_rating),
        text(&o.last_blog_update),
        text(&o.linkedin_url),
        text(&o.instagram_url),
        text(&o.facebook_url),
        boolean(&o.advertises_24_7_maintenance),
        boolean(&o.advertises_tenant_portal),
        boolean(&o.is_hiring),
    ]
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Json => "application/json",
        }
    }
}

/// A generated downloadable file.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Serializes the records into the requested format.
///
/// Returns `Ok(None)` for an empty record list: no file is produced.
pub fn export_firms(
    records: &[FirmRecord],
    format: ExportFormat,
    filename_base: Option<&str>,
) -> Result<Option<ExportArtifact>, AppError> {
    if records.is_empty() {
        return Ok(None);
    }

    let bytes = match format {
        ExportFormat::Csv => write_csv(records)?,
        ExportFormat::Xlsx => write_xlsx(records)?,
        ExportFormat::Pdf => write_pdf(records)?,
        ExportFormat::Json => write_json(records)?,
    };

    let base = filename_base.unwrap_or("firms");
    let filename = format!(
        "{}_{}.{}",
        base,
        Utc::now().timestamp_millis(),
        format.extension()
    );

    Ok(Some(ExportArtifact {
        filename,
        content_type: format.content_type(),
        bytes,
    }))
}

fn write_csv(records: &[FirmRecord]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(FLATTENED_FIELDS)
        .map_err(|e| AppError::InternalError(format!("CSV write failed: {}", e)))?;
    for record in records {
        let cells: Vec<String> = flatten_record(record).iter().map(|v| v.as_cell()).collect();
        writer
            .write_record(&cells)
            .map_err(|e| AppError::InternalError(format!("CSV write failed: {}", e)))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV write failed: {}", e)))
}

fn write_xlsx(records: &[FirmRecord]) -> Result<Vec<u8>, AppError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| {
        AppError::InternalError(format!("XLSX write failed: {}", e))
    };

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Firms").map_err(xlsx_err)?;

    for (col, header) in FLATTENED_FIELDS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(xlsx_err)?;
    }
    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, value) in flatten_record(record).iter().enumerate() {
            let col = col as u16;
            match value {
                FlatValue::Text(s) => worksheet.write_string(row, col, s).map_err(xlsx_err)?,
                FlatValue::Number(n) => worksheet.write_number(row, col, *n).map_err(xlsx_err)?,
                FlatValue::Bool(b) => worksheet.write_boolean(row, col, *b).map_err(xlsx_err)?,
                FlatValue::Empty => continue,
            };
        }
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

fn write_pdf(records: &[FirmRecord]) -> Result<Vec<u8>, AppError> {
    use printpdf::{BuiltinFont, Mm, PdfDocument};

    // A4 landscape.
    const PAGE_W: f32 = 297.0;
    const PAGE_H: f32 = 210.0;
    const MARGIN: f32 = 10.0;
    const ROW_STEP: f32 = 5.0;
    const FONT_SIZE: f32 = 5.0;
    const TITLE_SIZE: f32 = 10.0;

    let col_width = (PAGE_W - 2.0 * MARGIN) / FLATTENED_FIELDS.len() as f32;
    // Rough per-column character budget at the table font size.
    let max_chars = (col_width / 1.1) as usize;

    let (doc, page, layer) = PdfDocument::new("Firm Data Export", Mm(PAGE_W), Mm(PAGE_H), "Table");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::InternalError(format!("PDF write failed: {}", e)))?;

    let mut current_layer = doc.get_page(page).get_layer(layer);
    current_layer.use_text("Firm Data Export", TITLE_SIZE, Mm(MARGIN), Mm(PAGE_H - 8.0), &font);

    let mut y = PAGE_H - 18.0;
    let draw_row = |layer: &printpdf::PdfLayerReference, y: f32, cells: &[String]| {
        for (col, cell) in cells.iter().enumerate() {
            let truncated: String = cell.chars().take(max_chars).collect();
            if truncated.is_empty() {
                continue;
            }
            let x = MARGIN + col as f32 * col_width;
            layer.use_text(truncated, FONT_SIZE, Mm(x), Mm(y), &font);
        }
    };

    let headers: Vec<String> = FLATTENED_FIELDS.iter().map(|h| h.to_string()).collect();
    draw_row(&current_layer, y, &headers);
    y -= ROW_STEP;

    for record in records {
        if y < MARGIN {
            let (next_page, next_layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Table");
            current_layer = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_H - 18.0;
            draw_row(&current_layer, y, &headers);
            y -= ROW_STEP;
        }
        let cells: Vec<String> = flatten_record(record).iter().map(|v| v.as_cell()).collect();
        draw_row(&current_layer, y, &cells);
        y -= ROW_STEP;
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::InternalError(format!("PDF write failed: {}", e)))
}

fn write_json(records: &[FirmRecord]) -> Result<Vec<u8>, AppError> {
    let flattened: Vec<Map<String, Value>> = records.iter().map(flatten_to_json).collect();
    serde_json::to_vec_pretty(&flattened)
        .map_err(|e| AppError::InternalError(format!("JSON write failed: {}", e)))
}

/// Flattened object form of a record, keyed by [`FLATTENED_FIELDS`].
pub fn flatten_to_json(record: &FirmRecord) -> Map<String, Value> {
    FLATTENED_FIELDS
        .iter()
        .zip(flatten_record(record))
        .map(|(key, value)| (key.to_string(), value.to_json()))
        .collect()
}
