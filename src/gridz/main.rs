use chrono::Utc;
use clap::Parser;
use colored::*;
use gridz::api::GridzApi;
use gridz::error::{GridzError, Result};
use gridz::io::ImportReport;
use gridz::model::{
    ColumnSpec, Record, SortDirection, Theme, Value, coerce_value, fresh_record_id,
    normalize_field_key,
};
use gridz::prefs::{FilePrefStore, InMemoryPrefStore, PrefStore};
use gridz::state::TableState;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod args;
mod render;

use args::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_prefs {
        return run_session(&cli, InMemoryPrefStore::new());
    }

    let path = match &cli.prefs_file {
        Some(path) => path.clone(),
        None => FilePrefStore::default_location().ok_or_else(|| {
            GridzError::Input(
                "Could not determine a preferences location; use --prefs-file or --no-prefs"
                    .to_string(),
            )
        })?,
    };
    let store = FilePrefStore::new(path);
    debug!("preferences file: {}", store.path().display());
    run_session(&cli, store)
}

fn run_session<P: PrefStore>(cli: &Cli, prefs: P) -> Result<()> {
    let mut api = GridzApi::new(prefs);
    api.restore_preferences();

    if let Some(size) = cli.page_size {
        api.set_page_size(size)?;
    }

    if let Some(path) = &cli.data {
        let file = File::open(path).map_err(GridzError::Io)?;
        let report = api.import_csv(file)?;
        print_report(&report);
    }

    let view = api.page_view();
    println!("{}", render::render_grid(api.state(), &view));

    let interactive = std::io::stdin().is_terminal();
    if interactive {
        println!("{}", "Type 'help' for commands, 'quit' to leave.".dimmed());
    }

    let stdin = std::io::stdin();
    let mut input = String::new();
    loop {
        if interactive {
            print!("gridz> ");
            std::io::stdout().flush().map_err(GridzError::Io)?;
        }
        input.clear();
        if stdin.read_line(&mut input).map_err(GridzError::Io)? == 0 {
            break;
        }
        match dispatch(&mut api, input.trim()) {
            Ok(SessionControl::Continue) => {}
            Ok(SessionControl::Quit) => break,
            Err(e) => print_error(&e),
        }
    }
    Ok(())
}

enum SessionControl {
    Continue,
    Quit,
}

fn dispatch<P: PrefStore>(api: &mut GridzApi<P>, line: &str) -> Result<SessionControl> {
    let words = split_words(line)?;
    let Some((command, args)) = words.split_first() else {
        return Ok(SessionControl::Continue);
    };

    match command.as_str() {
        "quit" | "exit" | "q" => return Ok(SessionControl::Quit),
        "show" | "ls" => handle_show(api),
        "search" | "s" => handle_search(api, args),
        "sort" => handle_sort(api, args),
        "page" | "p" => handle_page(api, args),
        "pagesize" => handle_page_size(api, args),
        "add" => handle_add(api, args),
        "edit" => handle_edit(api, args),
        "rm" | "del" => handle_delete(api, args),
        "edit-start" => handle_edit_start(api, args),
        "edit-stop" => handle_edit_stop(api, args),
        "save-all" => handle_save_all(api),
        "cancel-all" => handle_cancel_all(api),
        "cols" => handle_columns(api),
        "col" => handle_column(api, args),
        "import" => handle_import(api, args),
        "export" => handle_export(api, args),
        "theme" => handle_theme(api, args),
        "help" | "?" => handle_help(),
        other => Err(GridzError::Input(format!("Unknown command: {}", other))),
    }?;
    Ok(SessionControl::Continue)
}

fn handle_show<P: PrefStore>(api: &GridzApi<P>) -> Result<()> {
    let view = api.page_view();
    println!("{}", render::render_grid(api.state(), &view));
    Ok(())
}

fn handle_search<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    let term = args.join(" ");
    api.set_search_term(term.clone());
    if term.is_empty() {
        print_info("Search cleared");
    } else {
        let view = api.page_view();
        print_info(&format!(
            "{} of {} rows match \"{}\"",
            view.matched,
            api.state().records().len(),
            term
        ));
    }
    Ok(())
}

fn handle_sort<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    let Some(field) = args.first() else {
        return Err(GridzError::Input("Usage: sort FIELD [asc|desc]".to_string()));
    };
    let Some(column) = api.state().column(field) else {
        return Err(GridzError::UnknownField(field.clone()));
    };
    if !column.sortable {
        print_warning(&format!("Column {} is not sortable", field));
        return Ok(());
    }

    let direction = match args.get(1) {
        Some(word) => parse_direction(word)?,
        // Repeating the current ascending sort flips it, like clicking
        // a column header twice
        None => {
            if api.state().sort_field() == field
                && api.state().sort_direction() == SortDirection::Ascending
            {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            }
        }
    };

    api.set_sort(field, direction)?;
    print_info(&format!("Sorted by {} {}", field, direction_label(direction)));
    Ok(())
}

fn handle_page<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    let raw = args
        .first()
        .ok_or_else(|| GridzError::Input("Usage: page N".to_string()))?;
    let number: usize = raw
        .parse()
        .map_err(|_| GridzError::Input(format!("Invalid page number: {}", raw)))?;
    if number == 0 {
        return Err(GridzError::Input("Pages start at 1".to_string()));
    }

    api.set_page(number - 1);
    let view = api.page_view();
    print_info(&format!("page {}/{}", view.page + 1, view.page_count.max(1)));
    Ok(())
}

fn handle_page_size<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    let raw = args
        .first()
        .ok_or_else(|| GridzError::Input("Usage: pagesize N".to_string()))?;
    let size: usize = raw
        .parse()
        .map_err(|_| GridzError::Input(format!("Invalid page size: {}", raw)))?;
    api.set_page_size(size)?;
    print_info(&format!("{} rows per page", size));
    Ok(())
}

fn handle_add<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    if args.is_empty() {
        return Err(GridzError::Input("Usage: add FIELD=VALUE ...".to_string()));
    }

    let mut id = None;
    let mut assignments = Vec::new();
    for raw in args {
        let (field, value) = parse_assignment(raw)?;
        if field == "id" {
            id = Some(value);
            continue;
        }
        assignments.push(coerce_assignment(api.state(), &field, &value)?);
    }

    let filled = |f: &str| {
        assignments
            .iter()
            .any(|(field, value)| field == f && !value.to_string().trim().is_empty())
    };
    if !filled("name") || !filled("email") {
        return Err(GridzError::Input(
            "A record needs at least name and email".to_string(),
        ));
    }

    let mut record = Record::new(id.unwrap_or_else(fresh_record_id));
    for (field, value) in assignments {
        record.set_attr(field, value);
    }
    let id = record.id.clone();
    let name = record.attr("name").map(Value::to_string).unwrap_or_default();
    api.add_record(record)?;
    print_success(&format!("Added {} ({})", name, id));
    Ok(())
}

fn handle_edit<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    let Some((id, rest)) = args.split_first() else {
        return Err(GridzError::Input("Usage: edit ID FIELD=VALUE ...".to_string()));
    };
    if rest.is_empty() {
        return Err(GridzError::Input("Usage: edit ID FIELD=VALUE ...".to_string()));
    }

    let mut assignments = Vec::new();
    for raw in rest {
        let (field, value) = parse_assignment(raw)?;
        let Some(column) = api.state().column(&field) else {
            return Err(GridzError::UnknownField(field));
        };
        if !column.editable {
            print_warning(&format!("Column {} is not editable", field));
            return Ok(());
        }
        let value = coerce_value(&field, &value)
            .ok_or_else(|| GridzError::Input(format!("{} must be a number", field)))?;
        assignments.push((field, value));
    }

    if api.update_record(id, assignments) {
        print_success(&format!("Updated {}", id));
    } else {
        print_warning(&format!("No record with id {}", id));
    }
    Ok(())
}

fn handle_delete<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    let id = args
        .first()
        .ok_or_else(|| GridzError::Input("Usage: rm ID".to_string()))?;
    if api.delete_record(id) {
        print_success(&format!("Deleted record {}", id));
    } else {
        print_warning(&format!("No record with id {}", id));
    }
    Ok(())
}

fn handle_edit_start<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    let id = args
        .first()
        .ok_or_else(|| GridzError::Input("Usage: edit-start ID".to_string()))?;
    if api.state().record(id).is_none() {
        print_warning(&format!("No record with id {}", id));
        return Ok(());
    }
    if api.start_editing(id) {
        print_info(&format!("Editing {}", id));
    } else {
        print_info(&format!("Already editing {}", id));
    }
    Ok(())
}

fn handle_edit_stop<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    let id = args
        .first()
        .ok_or_else(|| GridzError::Input("Usage: edit-stop ID".to_string()))?;
    if api.stop_editing(id) {
        print_info(&format!("Stopped editing {}", id));
    } else {
        print_warning(&format!("Not editing {}", id));
    }
    Ok(())
}

fn handle_save_all<P: PrefStore>(api: &mut GridzApi<P>) -> Result<()> {
    let count = api.state().editing().len();
    api.clear_editing();
    print_success(&format!("Saved {} rows", count));
    Ok(())
}

fn handle_cancel_all<P: PrefStore>(api: &mut GridzApi<P>) -> Result<()> {
    let count = api.state().editing().len();
    api.clear_editing();
    print_info(&format!("Cancelled editing on {} rows", count));
    Ok(())
}

fn handle_columns<P: PrefStore>(api: &GridzApi<P>) -> Result<()> {
    println!("{}", render::render_columns(api.state()));
    Ok(())
}

fn handle_column<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    match args.split_first().map(|(sub, rest)| (sub.as_str(), rest)) {
        Some(("toggle", rest)) => {
            let field = rest
                .first()
                .ok_or_else(|| GridzError::Input("Usage: col toggle FIELD".to_string()))?;
            if api.toggle_column(field) {
                let shown = api.state().column(field).is_some_and(|c| c.visible);
                print_info(&format!(
                    "Column {} {}",
                    field,
                    if shown { "shown" } else { "hidden" }
                ));
            } else {
                print_warning(&format!("No column named {}", field));
            }
            Ok(())
        }
        Some(("add", rest)) => {
            let label = rest.join(" ");
            let label = label.trim();
            let field = normalize_field_key(label);
            if field.is_empty() {
                return Err(GridzError::Input("Usage: col add LABEL".to_string()));
            }
            api.add_column(ColumnSpec::new(&field, label))?;
            print_success(&format!("Added column {} ({})", label, field));
            Ok(())
        }
        Some(("order", rest)) => {
            if rest.is_empty() {
                return Err(GridzError::Input("Usage: col order FIELD ...".to_string()));
            }
            api.reorder_columns(rest)?;
            print_success("Column order updated");
            Ok(())
        }
        _ => Err(GridzError::Input(
            "Usage: col toggle|add|order ...".to_string(),
        )),
    }
}

fn handle_import<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    let path = args
        .first()
        .ok_or_else(|| GridzError::Input("Usage: import FILE".to_string()))?;
    let file = File::open(path).map_err(GridzError::Io)?;
    let report = api.import_csv(file)?;
    print_report(&report);
    Ok(())
}

fn handle_export<P: PrefStore>(api: &GridzApi<P>, args: &[String]) -> Result<()> {
    let path = match args.first() {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(format!("gridz-{}.csv", Utc::now().format("%Y-%m-%d_%H:%M:%S"))),
    };
    let file = File::create(&path).map_err(GridzError::Io)?;
    api.export_csv(file)?;
    print_success(&format!("Exported to {}", path.display()));
    Ok(())
}

fn handle_theme<P: PrefStore>(api: &mut GridzApi<P>, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        None => {
            print_info(&format!("Theme: {}", api.state().theme()));
            Ok(())
        }
        Some("light") => {
            api.set_theme(Theme::Light);
            print_info("Theme set to light");
            Ok(())
        }
        Some("dark") => {
            api.set_theme(Theme::Dark);
            print_info("Theme set to dark");
            Ok(())
        }
        Some(other) => Err(GridzError::Input(format!("Unknown theme: {}", other))),
    }
}

fn handle_help() -> Result<()> {
    let mut output = String::new();
    output.push_str("Commands:\n");
    output.push_str("  show                       Render the current page\n");
    output.push_str("  search [TERM]              Filter rows; no term clears the filter\n");
    output.push_str("  sort FIELD [asc|desc]      Sort by a column; repeat to flip direction\n");
    output.push_str("  page N                     Jump to page N\n");
    output.push_str("  pagesize N                 Rows per page\n");
    output.push_str("  add FIELD=VALUE ...        Add a record (name and email required)\n");
    output.push_str("  edit ID FIELD=VALUE ...    Change cells on a record\n");
    output.push_str("  rm ID                      Delete a record\n");
    output.push_str("  edit-start ID              Mark a row as being edited\n");
    output.push_str("  edit-stop ID               Unmark a row\n");
    output.push_str("  save-all                   Finish editing all marked rows\n");
    output.push_str("  cancel-all                 Stop editing all marked rows\n");
    output.push_str("  cols                       List column definitions\n");
    output.push_str("  col toggle FIELD           Show or hide a column\n");
    output.push_str("  col add LABEL              Add a column (field key derived from label)\n");
    output.push_str("  col order FIELD ...        Reorder columns (every field exactly once)\n");
    output.push_str("  import FILE                Import records from a CSV file\n");
    output.push_str("  export [FILE]              Export visible columns to CSV\n");
    output.push_str("  theme [light|dark]         Set or show the theme\n");
    output.push_str("  help                       This text\n");
    output.push_str("  quit                       Leave the session\n");
    print!("{}", output);
    Ok(())
}

fn print_report(report: &ImportReport) {
    print_success(&format!("Imported {} rows", report.imported));
    for rejection in &report.rejected {
        print_warning(&format!("Row {}: {}", rejection.row, rejection.reason));
    }
}

fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

fn print_success(message: &str) {
    println!("{}", message.green());
}

fn print_warning(message: &str) {
    println!("{}", message.yellow());
}

fn print_error(e: &GridzError) {
    println!("{}", e.to_string().red());
}

fn coerce_assignment(state: &TableState, field: &str, raw: &str) -> Result<(String, Value)> {
    if state.column(field).is_none() {
        return Err(GridzError::UnknownField(field.to_string()));
    }
    let value = coerce_value(field, raw)
        .ok_or_else(|| GridzError::Input(format!("{} must be a number", field)))?;
    Ok((field.to_string(), value))
}

fn parse_assignment(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(GridzError::Input(format!(
            "Expected FIELD=VALUE, got: {}",
            raw
        ))),
    }
}

fn parse_direction(word: &str) -> Result<SortDirection> {
    match word {
        "asc" | "ascending" => Ok(SortDirection::Ascending),
        "desc" | "descending" => Ok(SortDirection::Descending),
        other => Err(GridzError::Input(format!("Invalid direction: {}", other))),
    }
}

fn direction_label(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "ascending",
        SortDirection::Descending => "descending",
    }
}

fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }
    if in_quotes {
        return Err(GridzError::Input("Unterminated quote".to_string()));
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}
