use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_COLUMN_WIDTH: u16 = 150;

/// Fields that carry numeric values; everything else is text.
pub const NUMERIC_FIELDS: &[&str] = &["age"];

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Number(i64),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One row of managed data: a unique identifier plus an open set of
/// named attributes. Identifiers never change once assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub attrs: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, field: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(field.into(), value);
        self
    }

    pub fn attr(&self, field: &str) -> Option<&Value> {
        self.attrs.get(field)
    }

    pub fn set_attr(&mut self, field: impl Into<String>, value: Value) {
        self.attrs.insert(field.into(), value);
    }
}

/// Identifier for a record created during the session.
pub fn fresh_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Identifier for a record created by a CSV import.
pub fn fresh_import_id() -> String {
    format!("imported-{}", Uuid::new_v4())
}

/// Metadata describing one displayable, exportable attribute.
///
/// The serde defaults let sparse snapshots from older preference files
/// deserialize: a column entry carrying only `field` and `label` comes
/// back visible, sortable, not editable, at the default width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub field: String,
    pub label: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_width")]
    pub width: u16,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default)]
    pub editable: bool,
}

fn default_true() -> bool {
    true
}

fn default_width() -> u16 {
    DEFAULT_COLUMN_WIDTH
}

impl ColumnSpec {
    /// A visible, sortable, editable column at the default width.
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            visible: true,
            width: DEFAULT_COLUMN_WIDTH,
            sortable: true,
            editable: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Derives a column field key from a display label: lowercased, with
/// whitespace runs collapsed to single underscores. Import header
/// resolution uses the same derivation, which is what makes exported
/// files (label headers) re-importable.
pub fn normalize_field_key(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Coerces raw text into the value a field carries. Returns `None` when
/// a numeric field does not parse as an integer.
pub fn coerce_value(field: &str, raw: &str) -> Option<Value> {
    if NUMERIC_FIELDS.contains(&field) {
        raw.trim().parse().ok().map(Value::Number)
    } else {
        Some(Value::text(raw))
    }
}

/// The built-in column set: four visible, two hidden.
pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("name", "Name"),
        ColumnSpec::new("email", "Email").with_width(200),
        ColumnSpec::new("age", "Age").with_width(100),
        ColumnSpec::new("role", "Role"),
        ColumnSpec::new("department", "Department").hidden(),
        ColumnSpec::new("location", "Location").hidden(),
    ]
}

/// The sample collection a fresh table starts with.
pub fn seed_records() -> Vec<Record> {
    [
        ("1", "John Doe", "john@example.com", 30, "Developer"),
        ("2", "Jane Smith", "jane@example.com", 25, "Designer"),
        ("3", "Bob Johnson", "bob@example.com", 35, "Manager"),
        ("4", "Alice Brown", "alice@example.com", 28, "Developer"),
        ("5", "Charlie Wilson", "charlie@example.com", 32, "QA Engineer"),
        ("6", "Diana Davis", "diana@example.com", 29, "Product Manager"),
        ("7", "Edward Miller", "edward@example.com", 31, "Developer"),
        ("8", "Fiona Garcia", "fiona@example.com", 27, "Designer"),
        ("9", "George Martinez", "george@example.com", 33, "DevOps"),
        ("10", "Helen Rodriguez", "helen@example.com", 26, "Developer"),
        ("11", "Ian Thompson", "ian@example.com", 34, "Architect"),
        ("12", "Julia White", "julia@example.com", 30, "Scrum Master"),
    ]
    .into_iter()
    .map(|(id, name, email, age, role)| {
        Record::new(id)
            .with_attr("name", Value::text(name))
            .with_attr("email", Value::text(email))
            .with_attr("age", Value::Number(age))
            .with_attr("role", Value::text(role))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_labels_to_field_keys() {
        assert_eq!(normalize_field_key("Hire Date"), "hire_date");
        assert_eq!(normalize_field_key("  Spaced   Out  "), "spaced_out");
        assert_eq!(normalize_field_key("UPPER"), "upper");
        assert_eq!(normalize_field_key("name"), "name");
    }

    #[test]
    fn coerces_numeric_fields() {
        assert_eq!(coerce_value("age", "30"), Some(Value::Number(30)));
        assert_eq!(coerce_value("age", " 42 "), Some(Value::Number(42)));
        assert_eq!(coerce_value("age", "abc"), None);
        assert_eq!(coerce_value("age", "30.5"), None);
    }

    #[test]
    fn text_fields_stay_text() {
        assert_eq!(coerce_value("name", "30"), Some(Value::text("30")));
        assert_eq!(coerce_value("role", "QA"), Some(Value::text("QA")));
    }

    #[test]
    fn values_display_plainly() {
        assert_eq!(Value::Number(5).to_string(), "5");
        assert_eq!(Value::text("Jane").to_string(), "Jane");
    }

    #[test]
    fn sparse_column_json_gets_defaults() {
        let col: ColumnSpec = serde_json::from_str(r#"{"field":"x","label":"X"}"#).unwrap();
        assert!(col.visible);
        assert_eq!(col.width, DEFAULT_COLUMN_WIDTH);
        assert!(col.sortable);
        assert!(!col.editable);
    }

    #[test]
    fn column_json_round_trips() {
        let col = ColumnSpec::new("email", "Email").with_width(200).hidden();
        let json = serde_json::to_string(&col).unwrap();
        let back: ColumnSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, col);
    }

    #[test]
    fn seed_collection_is_consistent() {
        let records = seed_records();
        assert_eq!(records.len(), 12);

        let mut ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 12);

        for record in &records {
            assert!(matches!(record.attr("age"), Some(Value::Number(_))));
            assert!(record.attr("name").is_some());
            assert!(record.attr("email").is_some());
        }

        let columns = default_columns();
        assert_eq!(columns.len(), 6);
        assert_eq!(columns.iter().filter(|c| c.visible).count(), 4);
    }

    #[test]
    fn import_ids_are_marked_and_unique() {
        let a = fresh_import_id();
        let b = fresh_import_id();
        assert!(a.starts_with("imported-"));
        assert_ne!(a, b);
    }
}
