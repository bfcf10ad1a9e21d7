use colored::*;
use gridz::model::{Theme, Value};
use gridz::state::TableState;
use gridz::view::PageView;
use unicode_width::UnicodeWidthStr;

const EDIT_MARKER: &str = "✎";
const ID_WIDTH_MAX: usize = 14;

/// Renders the current page as an aligned grid with a footer line.
pub fn render_grid(state: &TableState, view: &PageView) -> String {
    if view.matched == 0 {
        if state.search_term().is_empty() {
            return "No rows found.".to_string();
        }
        return format!("No rows match \"{}\".", state.search_term());
    }

    let columns: Vec<_> = state.visible_columns().collect();
    let id_width = view
        .records
        .iter()
        .map(|r| r.id.width())
        .max()
        .unwrap_or(2)
        .clamp(2, ID_WIDTH_MAX);

    let mut lines = Vec::new();

    let mut header = format!("  {}", pad_cell("id", id_width));
    for col in &columns {
        header.push_str("  ");
        header.push_str(&pad_cell(&col.label, cell_width(col.width)));
    }
    let styled_header = match state.theme() {
        Theme::Dark => header.bold().bright_white(),
        Theme::Light => header.bold(),
    };
    lines.push(styled_header.to_string());

    let rule_width = 2 + id_width + columns.iter().map(|c| 2 + cell_width(c.width)).sum::<usize>();
    lines.push("-".repeat(rule_width).dimmed().to_string());

    for record in &view.records {
        let marker = if state.is_editing(&record.id) {
            format!("{} ", EDIT_MARKER.yellow())
        } else {
            "  ".to_string()
        };
        let mut line = format!("{}{}", marker, pad_cell(&record.id, id_width).dimmed());
        for col in &columns {
            let text = record
                .attr(&col.field)
                .map(Value::to_string)
                .unwrap_or_default();
            line.push_str("  ");
            line.push_str(&pad_cell(&text, cell_width(col.width)));
        }
        lines.push(line);
    }

    let mut footer = format!(
        "page {}/{} · {} of {} rows",
        view.page + 1,
        view.page_count,
        view.records.len(),
        view.matched
    );
    if !state.search_term().is_empty() {
        footer.push_str(&format!(" · search: \"{}\"", state.search_term()));
    }
    lines.push(footer.dimmed().to_string());

    lines.join("\n")
}

/// Lists every column definition, hidden ones included.
pub fn render_columns(state: &TableState) -> String {
    let mut lines = Vec::new();
    for col in state.columns() {
        let shown = if col.visible { "shown" } else { "hidden" };
        let mut flags = Vec::new();
        if col.sortable {
            flags.push("sortable");
        }
        if col.editable {
            flags.push("editable");
        }
        lines.push(format!(
            "{:<12} {:<16} {:<7} width {:<4} {}",
            col.field,
            col.label,
            shown,
            col.width,
            flags.join(", ")
        ));
    }
    lines.join("\n")
}

/// Column widths are stored in pixel-ish units; a tenth of that is a
/// sensible character budget for a terminal cell.
fn cell_width(stored: u16) -> usize {
    (stored as usize / 10).clamp(6, 40)
}

fn pad_cell(text: &str, width: usize) -> String {
    let shown = truncate_to_width(text, width);
    let padding = width.saturating_sub(shown.width());
    format!("{}{}", shown, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}
