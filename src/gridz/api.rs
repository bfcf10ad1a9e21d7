//! # API Facade
//!
//! The API layer is a **thin facade** over the state container, the view
//! pipeline, and the import/export adapter. It is the single entry point
//! for all gridz operations, regardless of the UI driving them.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Dispatches** to the state container and stateless helpers
//! - **Owns the persistence policy**: a snapshot is written after every
//!   mutation that touches columns, theme, or page size, and restored
//!   once at startup
//! - **Keeps persistence best-effort**: save and load failures are
//!   logged and swallowed, never surfaced to the caller
//!
//! ## What the Facade Does NOT Do
//!
//! - **State transitions**: those live in [`TableState`]
//! - **Presentation concerns**: it returns data structures, not strings
//!
//! ## Generic Over PrefStore
//!
//! `GridzApi<P: PrefStore>` is generic over the preference backend:
//! - Production: `GridzApi<FilePrefStore>`
//! - Testing: `GridzApi<InMemoryPrefStore>`

use crate::error::Result;
use crate::io::{self, ImportReport};
use crate::model::{ColumnSpec, Record, SortDirection, Theme, Value};
use crate::prefs::PrefStore;
use crate::state::TableState;
use crate::view::{self, PageView};
use std::io::{Read, Write};
use tracing::warn;

/// The main entry point for gridz operations.
///
/// Wraps a freshly seeded [`TableState`] together with a preference
/// backend and keeps the two in sync.
pub struct GridzApi<P: PrefStore> {
    state: TableState,
    prefs: P,
}

impl<P: PrefStore> GridzApi<P> {
    pub fn new(prefs: P) -> Self {
        Self {
            state: TableState::new(),
            prefs,
        }
    }

    /// Merges the saved snapshot, if any, into the fresh state. Unusable
    /// snapshots are logged and dropped; the session starts from
    /// defaults either way.
    pub fn restore_preferences(&mut self) {
        match self.prefs.load() {
            Ok(Some(snapshot)) => {
                if let Err(e) = self.state.apply_snapshot(snapshot) {
                    warn!("ignoring invalid preferences snapshot: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("could not load preferences: {}", e),
        }
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    /// The filtered, sorted page the presentation layer should show.
    pub fn page_view(&self) -> PageView {
        view::page_view(&self.state)
    }

    pub fn add_record(&mut self, record: Record) -> Result<()> {
        self.state.add_record(record)
    }

    pub fn update_record(&mut self, id: &str, assignments: Vec<(String, Value)>) -> bool {
        self.state.update_record(id, assignments)
    }

    pub fn delete_record(&mut self, id: &str) -> bool {
        self.state.delete_record(id)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.set_search_term(term);
    }

    pub fn set_sort(&mut self, field: &str, direction: SortDirection) -> Result<()> {
        self.state.set_sort(field, direction)
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.set_page(page);
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        self.state.set_page_size(size)?;
        self.persist();
        Ok(())
    }

    pub fn toggle_column(&mut self, field: &str) -> bool {
        let toggled = self.state.toggle_column(field);
        if toggled {
            self.persist();
        }
        toggled
    }

    pub fn add_column(&mut self, spec: ColumnSpec) -> Result<()> {
        self.state.add_column(spec)?;
        self.persist();
        Ok(())
    }

    pub fn reorder_columns<S: AsRef<str>>(&mut self, ordered: &[S]) -> Result<()> {
        self.state.reorder_columns(ordered)?;
        self.persist();
        Ok(())
    }

    pub fn start_editing(&mut self, id: &str) -> bool {
        self.state.start_editing(id)
    }

    pub fn stop_editing(&mut self, id: &str) -> bool {
        self.state.stop_editing(id)
    }

    pub fn clear_editing(&mut self) {
        self.state.clear_editing();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state.set_theme(theme);
        self.persist();
    }

    pub fn import_csv<R: Read>(&mut self, input: R) -> Result<ImportReport> {
        io::import_csv(&mut self.state, input)
    }

    pub fn export_csv<W: Write>(&self, output: W) -> Result<()> {
        io::export_csv(&self.state, output)
    }

    fn persist(&mut self) {
        if let Err(e) = self.prefs.save(&self.state.snapshot()) {
            warn!("could not save preferences: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{InMemoryPrefStore, Snapshot};

    fn api() -> GridzApi<InMemoryPrefStore> {
        GridzApi::new(InMemoryPrefStore::new())
    }

    fn saved_snapshot(api: &GridzApi<InMemoryPrefStore>) -> Option<Snapshot> {
        api.prefs()
            .raw()
            .map(|raw| serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn column_changes_persist_immediately() {
        let mut api = api();
        assert!(api.toggle_column("email"));

        let saved = saved_snapshot(&api).unwrap();
        let email = saved.columns.iter().find(|c| c.field == "email").unwrap();
        assert!(!email.visible);
    }

    #[test]
    fn theme_and_page_size_persist() {
        let mut api = api();
        api.set_theme(Theme::Dark);
        api.set_page_size(25).unwrap();

        let saved = saved_snapshot(&api).unwrap();
        assert_eq!(saved.theme, Theme::Dark);
        assert_eq!(saved.page_size, 25);
    }

    #[test]
    fn added_and_reordered_columns_persist() {
        let mut api = api();
        api.add_column(ColumnSpec::new("notes", "Notes")).unwrap();
        assert_eq!(saved_snapshot(&api).unwrap().columns.len(), 7);

        api.reorder_columns(&[
            "notes",
            "name",
            "email",
            "age",
            "role",
            "department",
            "location",
        ])
        .unwrap();
        assert_eq!(
            saved_snapshot(&api).unwrap().columns[0].field,
            "notes".to_string()
        );
    }

    #[test]
    fn record_and_view_changes_do_not_persist() {
        let mut api = api();
        api.add_record(Record::new("99")).unwrap();
        api.set_search_term("developer");
        api.set_sort("age", SortDirection::Descending).unwrap();
        api.set_page(1);
        api.start_editing("1");

        assert_eq!(api.prefs().raw(), None);
    }

    #[test]
    fn rejected_mutations_do_not_persist() {
        let mut api = api();
        assert!(api.set_page_size(0).is_err());
        assert!(!api.toggle_column("bogus"));
        assert_eq!(api.prefs().raw(), None);
    }

    #[test]
    fn restore_applies_a_saved_snapshot() {
        let mut seed = api();
        seed.set_theme(Theme::Dark);
        seed.set_page_size(25).unwrap();
        let payload = seed.prefs().raw().unwrap().to_string();

        let mut api = GridzApi::new(InMemoryPrefStore::with_raw(payload));
        api.restore_preferences();

        assert_eq!(api.state().theme(), Theme::Dark);
        assert_eq!(api.state().page_size(), 25);
        assert_eq!(api.state().records().len(), 12);
    }

    #[test]
    fn restore_ignores_corrupt_payloads() {
        let mut api = GridzApi::new(InMemoryPrefStore::with_raw("}{ nope"));
        api.restore_preferences();
        assert_eq!(api.state().page_size(), 10);
        assert_eq!(api.state().theme(), Theme::Light);
    }

    #[test]
    fn restore_refuses_snapshots_that_break_invariants() {
        let broken = Snapshot {
            columns: crate::model::default_columns(),
            theme: Theme::Dark,
            page_size: 0,
        };
        let payload = serde_json::to_string(&broken).unwrap();

        let mut api = GridzApi::new(InMemoryPrefStore::with_raw(payload));
        api.restore_preferences();

        assert_eq!(api.state().page_size(), 10);
        assert_eq!(api.state().theme(), Theme::Light);
    }

    #[test]
    fn write_failures_are_swallowed() {
        let mut store = InMemoryPrefStore::new();
        store.set_simulate_write_error(true);
        let mut api = GridzApi::new(store);

        assert!(api.toggle_column("email"));
        let email = api.state().column("email").unwrap();
        assert!(!email.visible);
        assert_eq!(api.prefs().raw(), None);
    }

    #[test]
    fn import_and_export_flow_through_the_facade() {
        let mut api = api();
        let report = api
            .import_csv("name,email\nZoe Hall,zoe@example.com\n".as_bytes())
            .unwrap();
        assert_eq!(report.imported, 1);

        let mut out = Vec::new();
        api.export_csv(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Zoe Hall"));
    }
}
