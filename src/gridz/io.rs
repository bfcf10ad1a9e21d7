//! CSV import and export over arbitrary readers and writers.
//!
//! Import is all-or-nothing at the parse level: the entire stream is
//! decoded before any record is added, so a malformed file can never
//! leave a half-applied import behind. Individual rows that parse but
//! fail validation are reported back, not treated as errors.

use crate::error::Result;
use crate::model::{Record, Value, coerce_value, fresh_import_id, normalize_field_key};
use crate::state::TableState;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use tracing::debug;

/// A data row that parsed but failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 1-based position among the data rows (the header row is row 0).
    pub row: usize,
    pub reason: String,
}

/// Outcome of an import: how many rows landed, and why the rest did not.
#[derive(Debug, Default, Clone)]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Reads CSV from `input` and appends the valid rows to the collection.
///
/// Headers are matched to columns by field key first, then by the
/// normalized form of the header text, so a file exported with display
/// labels re-imports cleanly. Unmatched headers are ignored.
pub fn import_csv<R: Read>(state: &mut TableState, input: R) -> Result<ImportReport> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();
    let fields: Vec<Option<String>> = headers
        .iter()
        .map(|header| resolve_header(state, header))
        .collect();

    let rows: Vec<csv::StringRecord> =
        reader.records().collect::<std::result::Result<_, _>>()?;

    let mut report = ImportReport::default();
    for (index, row) in rows.iter().enumerate() {
        let line = index + 1;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        match build_record(&fields, row) {
            Ok(record) => {
                state.add_record(record)?;
                report.imported += 1;
            }
            Err(reason) => {
                debug!("import rejected row {}: {}", line, reason);
                report.rejected.push(RejectedRow { row: line, reason });
            }
        }
    }
    Ok(report)
}

/// Writes the collection as CSV: visible columns only, in display
/// order, with each column's label as the header. Every record is
/// exported regardless of the active filter.
pub fn export_csv<W: Write>(state: &TableState, output: W) -> Result<()> {
    let columns: Vec<_> = state.visible_columns().collect();
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(columns.iter().map(|c| c.label.as_str()))?;
    for record in state.records() {
        let row: Vec<String> = columns
            .iter()
            .map(|c| {
                record
                    .attr(&c.field)
                    .map(Value::to_string)
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn resolve_header(state: &TableState, header: &str) -> Option<String> {
    if state.column(header).is_some() {
        return Some(header.to_string());
    }
    let key = normalize_field_key(header);
    state.column(&key).map(|column| column.field.clone())
}

fn build_record(
    fields: &[Option<String>],
    row: &csv::StringRecord,
) -> std::result::Result<Record, String> {
    let mut cells: BTreeMap<&str, &str> = BTreeMap::new();
    for (field, cell) in fields.iter().zip(row.iter()) {
        if let Some(field) = field {
            cells.insert(field.as_str(), cell);
        }
    }

    let name = cells.get("name").map_or("", |s| s.trim());
    let email = cells.get("email").map_or("", |s| s.trim());
    if name.is_empty() || email.is_empty() {
        return Err("Missing required fields (name, email)".to_string());
    }

    let age = match cells.get("age").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(raw) => coerce_value("age", raw).ok_or_else(|| "Age must be a number".to_string())?,
        None => Value::Number(0),
    };

    let role = cells
        .get("role")
        .copied()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("Unknown");

    let mut record = Record::new(fresh_import_id())
        .with_attr("name", Value::text(name))
        .with_attr("email", Value::text(email))
        .with_attr("age", age)
        .with_attr("role", Value::text(role))
        .with_attr(
            "department",
            Value::text(cells.get("department").copied().unwrap_or("")),
        )
        .with_attr(
            "location",
            Value::text(cells.get("location").copied().unwrap_or("")),
        );

    for (field, cell) in &cells {
        if !matches!(
            *field,
            "name" | "email" | "age" | "role" | "department" | "location"
        ) {
            record.set_attr(*field, Value::text(*cell));
        }
    }
    Ok(record)
}
