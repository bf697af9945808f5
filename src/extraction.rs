//! Row-level arithmetic for the extraction console.
//!
//! Everything here is pure and synchronous: the HTTP layer and the vision
//! relay call into these functions, and the same functions back the editing
//! operations (add row, delete row, edit row, new empty set). Derived fields
//! (`count`, `sum`, `average` and the set-level aggregates) are never trusted
//! from the outside; `recompute` is the single source of truth for them.

use crate::errors::AppError;
use crate::models::{NumberRow, ResultSet};

/// Fixed instruction sent to the vision model alongside the image.
pub const EXTRACTION_PROMPT: &str = "You are an OCR assistant.\n\
    Extract all numbers from the image row by row.\n\
    For each row, return JSON with keys: \"numbers\", \"count\", \"sum\".\n\
    Also add a \"grand_total\".\n\
    JSON only, no text.";

/// How an edit commit treats entries that do not parse as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPolicy {
    /// Unparsable entries coerce to zero, then every zero (coerced or
    /// typed) is dropped on save.
    Lenient,
    /// Blank entries delete the value, unparsable entries reject the whole
    /// edit, and a parsed zero is kept as a legitimate value.
    Strict,
}

/// Recomputes a row's derived statistics from its numbers.
pub fn recompute_row(row: &mut NumberRow) {
    row.count = row.numbers.len();
    row.sum = row.numbers.iter().sum();
    row.average = if row.count > 0 {
        row.sum / row.count as f64
    } else {
        0.0
    };
}

/// Recomputes every row and the set-level aggregates.
///
/// Idempotent: re-applying to an already-consistent set changes nothing.
pub fn recompute(set: &mut ResultSet) {
    for row in &mut set.rows {
        recompute_row(row);
    }
    set.total_count = set.rows.iter().map(|r| r.count).sum();
    set.grand_total = set.rows.iter().map(|r| r.sum).sum();
    set.overall_average = if set.total_count > 0 {
        set.grand_total / set.total_count as f64
    } else {
        0.0
    };
}

/// Appends a row and recomputes the aggregates.
pub fn add_row(set: &mut ResultSet, numbers: Vec<f64>) {
    set.rows.push(NumberRow::new(numbers));
    recompute(set);
}

/// Removes the row at `index`.
///
/// Deleting the last remaining row clears the entire result set; there is no
/// empty-but-present state.
pub fn delete_row(set: &mut ResultSet, index: usize) -> Result<(), AppError> {
    if index >= set.rows.len() {
        return Err(AppError::BadRequest(format!(
            "Row index {} out of range (set has {} rows)",
            index,
            set.rows.len()
        )));
    }
    set.rows.remove(index);
    if set.rows.is_empty() {
        *set = ResultSet::new();
    } else {
        recompute(set);
    }
    Ok(())
}

/// Parses edit-buffer entries into the row's new numeric list.
pub fn parse_entries(entries: &[String], policy: EditPolicy) -> Result<Vec<f64>, AppError> {
    match policy {
        EditPolicy::Lenient => Ok(entries
            .iter()
            .map(|e| e.trim().parse::<f64>().unwrap_or(0.0))
            .filter(|n| *n != 0.0)
            .collect()),
        EditPolicy::Strict => {
            let mut values = Vec::with_capacity(entries.len());
            let mut invalid = Vec::new();
            for entry in entries {
                let trimmed = entry.trim();
                if trimmed.is_empty() {
                    // Deletion affordance: a blanked entry removes the value.
                    continue;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) => values.push(n),
                    Err(_) => invalid.push(trimmed.to_string()),
                }
            }
            if !invalid.is_empty() {
                return Err(AppError::BadRequest(format!(
                    "Entries are not numeric: {}",
                    invalid.join(", ")
                )));
            }
            Ok(values)
        }
    }
}

/// Commits an edit of the row at `index` and recomputes the aggregates.
pub fn edit_row(
    set: &mut ResultSet,
    index: usize,
    entries: &[String],
    policy: EditPolicy,
) -> Result<(), AppError> {
    let len = set.rows.len();
    let row = set
        .rows
        .get_mut(index)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Row index {} out of range (set has {} rows)",
                index, len
            ))
        })?;
    row.numbers = parse_entries(entries, policy)?;
    recompute(set);
    Ok(())
}

/// Strips Markdown code-fence markers the model tends to wrap JSON in.
pub fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Drop a language tag like ```json, fenced with or without a
        // newline after it.
        s = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Parses the model's reply text into a normalized [`ResultSet`].
///
/// The reply may be fenced; derived fields the model omitted or miscomputed
/// are recomputed before the set is returned. A parse failure carries the
/// raw text so the caller can surface it for diagnosis.
pub fn parse_model_reply(text: &str) -> Result<ResultSet, AppError> {
    let stripped = strip_code_fences(text);
    let mut set: ResultSet =
        serde_json::from_str(stripped).map_err(|e| AppError::ShapeError {
            message: format!("Failed to parse model response as JSON: {}", e),
            raw_response: text.to_string(),
        })?;
    recompute(&mut set);
    Ok(set)
}
