//! The view pipeline: filter → sort → paginate, recomputed from the
//! state container on every read.
//!
//! The search surface is the fixed six-field set below, independent of
//! which columns are currently visible—hiding a column must not change
//! the match set. The requested page is clamped here rather than at
//! mutation time, so a filter that shrinks the result never strands the
//! session on an empty page.

use crate::model::{Record, SortDirection, Value};
use crate::state::TableState;
use std::cmp::Ordering;

/// The fields a search term is matched against.
pub const SEARCH_FIELDS: [&str; 6] = [
    "name",
    "email",
    "age",
    "role",
    "department",
    "location",
];

/// The derived, render-ready slice of the collection.
#[derive(Debug, Clone)]
pub struct PageView {
    /// Records on the effective page, in sorted order.
    pub records: Vec<Record>,
    /// The effective (clamped) page index, zero-based.
    pub page: usize,
    /// Number of pages in the filtered result; zero when nothing matches.
    pub page_count: usize,
    pub page_size: usize,
    /// Total records matching the filter, across all pages.
    pub matched: usize,
}

/// Derives the page the presentation layer should show.
pub fn page_view(state: &TableState) -> PageView {
    let term = state.search_term().to_lowercase();
    let mut rows: Vec<&Record> = state
        .records()
        .iter()
        .filter(|r| matches_search(r, &term))
        .collect();

    let field = state.sort_field();
    let direction = state.sort_direction();
    rows.sort_by(|a, b| {
        let ord = compare_values(a.attr(field), b.attr(field));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    let matched = rows.len();
    let page_size = state.page_size();
    let page_count = matched.div_ceil(page_size);
    let page = if page_count == 0 {
        0
    } else {
        state.page().min(page_count - 1)
    };

    let records = rows
        .into_iter()
        .skip(page * page_size)
        .take(page_size)
        .cloned()
        .collect();

    PageView {
        records,
        page,
        page_count,
        page_size,
        matched,
    }
}

/// Case-insensitive substring match over the search surface. The term
/// must already be lowercased.
fn matches_search(record: &Record, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    SEARCH_FIELDS.iter().any(|field| {
        record
            .attr(field)
            .is_some_and(|value| value_contains(value, term))
    })
}

fn value_contains(value: &Value, term: &str) -> bool {
    match value {
        Value::Text(s) => s.to_lowercase().contains(term),
        Value::Number(n) => n.to_string().contains(term),
    }
}

/// Orders two cell values: numerically when both are numbers, by
/// case-insensitive text otherwise, coercing mismatched or missing
/// values to their display strings (absent attributes sort as empty).
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.cmp(y),
        (Some(Value::Text(x)), Some(Value::Text(y))) => collate(x, y),
        _ => {
            let x = a.map(Value::to_string).unwrap_or_default();
            let y = b.map(Value::to_string).unwrap_or_default();
            collate(&x, &y)
        }
    }
}

fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
