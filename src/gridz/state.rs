//! The state container: the record collection, the column set, and the
//! transient view parameters, with every mutation applied synchronously
//! and wholly-or-not.
//!
//! Mutations that can be refused return `Result` (the state is untouched
//! on `Err`); mutations aimed at a missing record or column are plain
//! no-ops signalled by a `bool`. Nothing in here performs I/O—the
//! persisted subset travels through [`Snapshot`] values produced by
//! [`TableState::snapshot`] and merged back by
//! [`TableState::apply_snapshot`].

use crate::error::{GridzError, Result};
use crate::model::{ColumnSpec, Record, SortDirection, Theme, Value, default_columns, seed_records};
use crate::prefs::Snapshot;
use std::collections::BTreeSet;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct TableState {
    records: Vec<Record>,
    columns: Vec<ColumnSpec>,
    search_term: String,
    sort_field: String,
    sort_direction: SortDirection,
    page: usize,
    page_size: usize,
    editing: BTreeSet<String>,
    theme: Theme,
}

impl TableState {
    /// Fresh state: the seed collection, the built-in columns, sorted by
    /// name ascending, first page, ten rows per page.
    pub fn new() -> Self {
        Self {
            records: seed_records(),
            columns: default_columns(),
            search_term: String::new(),
            sort_field: "name".to_string(),
            sort_direction: SortDirection::Ascending,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            editing: BTreeSet::new(),
            theme: Theme::Light,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, field: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.visible)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// The requested page index, zero-based. May point past the end of
    /// the current filtered result; the view pipeline clamps it.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn editing(&self) -> &BTreeSet<String> {
        &self.editing
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing.contains(id)
    }

    /// Appends a record. Identifiers are unique across the collection.
    pub fn add_record(&mut self, record: Record) -> Result<()> {
        if self.records.iter().any(|r| r.id == record.id) {
            return Err(GridzError::DuplicateIdentifier(record.id));
        }
        self.records.push(record);
        Ok(())
    }

    /// Merges the given attribute assignments into the matching record.
    /// Returns `false` when the id is unknown.
    pub fn update_record(&mut self, id: &str, assignments: Vec<(String, Value)>) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        for (field, value) in assignments {
            record.set_attr(field, value);
        }
        true
    }

    /// Removes the matching record. Returns `false` when the id is
    /// unknown.
    pub fn delete_record(&mut self, id: &str) -> bool {
        match self.records.iter().position(|r| r.id == id) {
            Some(idx) => {
                self.records.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Replaces the filter string and returns to the first page.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 0;
    }

    /// Replaces the sort key and direction. The current page is kept.
    pub fn set_sort(&mut self, field: &str, direction: SortDirection) -> Result<()> {
        if self.column(field).is_none() {
            return Err(GridzError::UnknownField(field.to_string()));
        }
        self.sort_field = field.to_string();
        self.sort_direction = direction;
        Ok(())
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Replaces the page size and returns to the first page.
    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(GridzError::InvalidPageSize(size));
        }
        self.page_size = size;
        self.page = 0;
        Ok(())
    }

    /// Flips the visibility of the named column. Returns `false` when
    /// the field is unknown.
    pub fn toggle_column(&mut self, field: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.field == field) {
            Some(col) => {
                col.visible = !col.visible;
                true
            }
            None => false,
        }
    }

    /// Appends a column definition. Field keys are unique across the
    /// column set.
    pub fn add_column(&mut self, spec: ColumnSpec) -> Result<()> {
        if self.columns.iter().any(|c| c.field == spec.field) {
            return Err(GridzError::DuplicateField(spec.field));
        }
        self.columns.push(spec);
        Ok(())
    }

    /// Rearranges the columns to match `ordered`. The sequence must be a
    /// permutation of the existing field keys: unknown keys, repeated
    /// keys, and omissions are each refused.
    pub fn reorder_columns<S: AsRef<str>>(&mut self, ordered: &[S]) -> Result<()> {
        let mut seen = BTreeSet::new();
        for field in ordered {
            let field = field.as_ref();
            if self.column(field).is_none() {
                return Err(GridzError::UnknownField(field.to_string()));
            }
            if !seen.insert(field) {
                return Err(GridzError::DuplicateField(field.to_string()));
            }
        }

        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !seen.contains(c.field.as_str()))
            .map(|c| c.field.clone())
            .collect();
        if !missing.is_empty() {
            return Err(GridzError::IncompleteOrder { missing });
        }

        let mut remaining = std::mem::take(&mut self.columns);
        let mut reordered = Vec::with_capacity(remaining.len());
        for field in ordered {
            if let Some(idx) = remaining.iter().position(|c| c.field == field.as_ref()) {
                reordered.push(remaining.remove(idx));
            }
        }
        self.columns = reordered;
        Ok(())
    }

    /// Replaces the set of record ids under edit.
    pub fn set_editing<S: Into<String>>(&mut self, ids: impl IntoIterator<Item = S>) {
        self.editing = ids.into_iter().map(Into::into).collect();
    }

    /// Marks a record as under edit. Returns `false` when it already was.
    pub fn start_editing(&mut self, id: &str) -> bool {
        self.editing.insert(id.to_string())
    }

    /// Unmarks a record. Returns `false` when it wasn't under edit.
    pub fn stop_editing(&mut self, id: &str) -> bool {
        self.editing.remove(id)
    }

    pub fn clear_editing(&mut self) {
        self.editing.clear();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// The persisted subset of state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            columns: self.columns.clone(),
            theme: self.theme,
            page_size: self.page_size,
        }
    }

    /// Merges a previously persisted snapshot into the current state.
    /// Records and view parameters other than the page size are left
    /// alone. A snapshot that would break the state invariants—no
    /// columns, repeated fields, zero page size—is refused wholesale.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.columns.is_empty() {
            return Err(GridzError::Input(
                "preferences snapshot has no columns".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for col in &snapshot.columns {
            if !seen.insert(col.field.as_str()) {
                return Err(GridzError::DuplicateField(col.field.clone()));
            }
        }
        if snapshot.page_size == 0 {
            return Err(GridzError::InvalidPageSize(0));
        }

        self.columns = snapshot.columns;
        self.theme = snapshot.theme;
        self.page_size = snapshot.page_size;

        // The restored column set may no longer carry the active sort key
        if !self.columns.iter().any(|c| c.field == self.sort_field)
            && let Some(first) = self.columns.first()
        {
            self.sort_field = first.field.clone();
        }
        Ok(())
    }
}

impl Default for TableState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_record_ids() {
        let mut state = TableState::new();
        let err = state.add_record(Record::new("1")).unwrap_err();
        assert!(matches!(err, GridzError::DuplicateIdentifier(id) if id == "1"));
        assert_eq!(state.records().len(), 12);
    }

    #[test]
    fn add_then_delete_restores_the_collection() {
        let mut state = TableState::new();
        let before = state.records().to_vec();

        state
            .add_record(Record::new("99").with_attr("name", Value::text("Temp")))
            .unwrap();
        assert_eq!(state.records().len(), 13);

        assert!(state.delete_record("99"));
        assert_eq!(state.records(), before.as_slice());
    }

    #[test]
    fn update_merges_assignments() {
        let mut state = TableState::new();
        let changed = state.update_record(
            "1",
            vec![
                ("age".to_string(), Value::Number(31)),
                ("role".to_string(), Value::text("Lead Developer")),
            ],
        );
        assert!(changed);

        let record = state.record("1").unwrap();
        assert_eq!(record.attr("age"), Some(&Value::Number(31)));
        assert_eq!(record.attr("role"), Some(&Value::text("Lead Developer")));
        assert_eq!(record.attr("name"), Some(&Value::text("John Doe")));
    }

    #[test]
    fn missing_ids_are_no_ops() {
        let mut state = TableState::new();
        assert!(!state.update_record("nope", vec![("age".to_string(), Value::Number(1))]));
        assert!(!state.delete_record("nope"));
        assert_eq!(state.records().len(), 12);
    }

    #[test]
    fn search_resets_the_page() {
        let mut state = TableState::new();
        state.set_page(3);
        state.set_search_term("dev");
        assert_eq!(state.page(), 0);
        assert_eq!(state.search_term(), "dev");
    }

    #[test]
    fn sort_requires_a_known_column() {
        let mut state = TableState::new();
        let err = state.set_sort("salary", SortDirection::Ascending).unwrap_err();
        assert!(matches!(err, GridzError::UnknownField(f) if f == "salary"));
        assert_eq!(state.sort_field(), "name");
    }

    #[test]
    fn sort_keeps_the_page() {
        let mut state = TableState::new();
        state.set_page(1);
        state.set_sort("age", SortDirection::Descending).unwrap();
        assert_eq!(state.page(), 1);
        assert_eq!(state.sort_direction(), SortDirection::Descending);
    }

    #[test]
    fn page_size_must_be_positive_and_resets_the_page() {
        let mut state = TableState::new();
        state.set_page(2);

        assert!(matches!(
            state.set_page_size(0),
            Err(GridzError::InvalidPageSize(0))
        ));
        assert_eq!(state.page_size(), DEFAULT_PAGE_SIZE);

        state.set_page_size(5).unwrap();
        assert_eq!(state.page_size(), 5);
        assert_eq!(state.page(), 0);
    }

    #[test]
    fn toggling_flips_visibility() {
        let mut state = TableState::new();
        assert!(state.toggle_column("department"));
        assert!(state.column("department").unwrap().visible);
        assert!(state.toggle_column("department"));
        assert!(!state.column("department").unwrap().visible);
        assert!(!state.toggle_column("salary"));
    }

    #[test]
    fn rejects_duplicate_column_fields() {
        let mut state = TableState::new();
        let err = state.add_column(ColumnSpec::new("name", "Name Again")).unwrap_err();
        assert!(matches!(err, GridzError::DuplicateField(f) if f == "name"));
        assert_eq!(state.columns().len(), 6);
    }

    #[test]
    fn reorders_columns() {
        let mut state = TableState::new();
        state
            .reorder_columns(&["email", "name", "age", "role", "location", "department"])
            .unwrap();
        let fields: Vec<_> = state.columns().iter().map(|c| c.field.as_str()).collect();
        assert_eq!(
            fields,
            ["email", "name", "age", "role", "location", "department"]
        );
    }

    #[test]
    fn reorder_refuses_unknown_and_repeated_fields() {
        let mut state = TableState::new();
        let before: Vec<_> = state.columns().to_vec();

        let err = state
            .reorder_columns(&["email", "salary", "name", "age", "role", "department"])
            .unwrap_err();
        assert!(matches!(err, GridzError::UnknownField(f) if f == "salary"));

        let err = state
            .reorder_columns(&["email", "email", "name", "age", "role", "department"])
            .unwrap_err();
        assert!(matches!(err, GridzError::DuplicateField(f) if f == "email"));

        assert_eq!(state.columns(), before.as_slice());
    }

    #[test]
    fn reorder_refuses_omissions() {
        let mut state = TableState::new();
        let err = state.reorder_columns(&["name"]).unwrap_err();
        match err {
            GridzError::IncompleteOrder { missing } => {
                assert_eq!(missing.len(), 5);
                assert!(missing.contains(&"email".to_string()));
                assert!(missing.contains(&"location".to_string()));
            }
            other => panic!("expected IncompleteOrder, got {other:?}"),
        }
        assert_eq!(state.columns()[0].field, "name");
    }

    #[test]
    fn tracks_the_edit_set() {
        let mut state = TableState::new();
        assert!(state.start_editing("1"));
        assert!(!state.start_editing("1"));
        assert!(state.start_editing("2"));
        assert!(state.is_editing("1"));

        assert!(state.stop_editing("1"));
        assert!(!state.stop_editing("1"));
        assert!(!state.is_editing("1"));

        state.set_editing(["3", "4"]);
        assert_eq!(state.editing().len(), 2);
        state.clear_editing();
        assert!(state.editing().is_empty());
    }

    #[test]
    fn snapshot_round_trips_through_apply() {
        let mut state = TableState::new();
        state.toggle_column("email");
        state.set_theme(Theme::Dark);
        state.set_page_size(25).unwrap();
        let snapshot = state.snapshot();

        let mut fresh = TableState::new();
        fresh.apply_snapshot(snapshot.clone()).unwrap();
        assert_eq!(fresh.snapshot(), snapshot);
        assert!(!fresh.column("email").unwrap().visible);
        assert_eq!(fresh.theme(), Theme::Dark);
        assert_eq!(fresh.page_size(), 25);
    }

    #[test]
    fn apply_refuses_broken_snapshots() {
        let mut state = TableState::new();
        let good = state.snapshot();

        let empty = Snapshot {
            columns: vec![],
            ..good.clone()
        };
        assert!(state.apply_snapshot(empty).is_err());

        let mut doubled = good.clone();
        doubled.columns.push(ColumnSpec::new("name", "Name Again"));
        assert!(matches!(
            state.apply_snapshot(doubled),
            Err(GridzError::DuplicateField(_))
        ));

        let zero = Snapshot {
            page_size: 0,
            ..good.clone()
        };
        assert!(matches!(
            state.apply_snapshot(zero),
            Err(GridzError::InvalidPageSize(0))
        ));

        assert_eq!(state.snapshot(), good);
    }

    #[test]
    fn apply_falls_back_to_the_first_column_for_a_lost_sort_key() {
        let mut state = TableState::new();
        state.set_sort("age", SortDirection::Descending).unwrap();

        let snapshot = Snapshot {
            columns: vec![
                ColumnSpec::new("email", "Email"),
                ColumnSpec::new("role", "Role"),
            ],
            theme: Theme::Light,
            page_size: 10,
        };
        state.apply_snapshot(snapshot).unwrap();
        assert_eq!(state.sort_field(), "email");
        // Direction survives the fallback
        assert_eq!(state.sort_direction(), SortDirection::Descending);
    }
}
