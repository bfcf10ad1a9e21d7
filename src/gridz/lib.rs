//! # Gridz Architecture
//!
//! Gridz is a **UI-agnostic data grid library**. This is not a terminal
//! application that happens to have some library code—it's a library that
//! happens to have a terminal client.
//!
//! That distinction drives the entire architecture and should guide all
//! development.
//!
//! ## The Layered Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs, render.rs)                    │
//! │  - Parses arguments, runs the session loop, renders grids   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over the state container                     │
//! │  - Restores preferences at startup, persists them after     │
//! │    any mutation of the saved subset                         │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core Layer (state.rs, view.rs, io.rs)                      │
//! │  - Record collection, columns, and view parameters          │
//! │  - Pure filter → sort → paginate derivation                 │
//! │  - CSV import/export over abstract Read/Write               │
//! │  - No I/O assumptions whatsoever                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Preference Layer (prefs/)                                  │
//! │  - Abstract PrefStore trait                                 │
//! │  - FilePrefStore (production), InMemoryPrefStore (testing)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What persists, and what doesn't
//!
//! Records live only for the duration of a session; the seed collection is
//! rebuilt on every start and imports are appended to it. The *preferences
//! snapshot*—column definitions, theme, and page size—is the one durable
//! piece of state, written whenever any of the three changes and restored
//! once at startup. Persistence is best-effort: a failing preference store
//! is logged and never interrupts the operation that triggered it.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward (API, state, view, io, prefs), code:
//! - Takes regular Rust function arguments
//! - Returns regular Rust types (`Result<T>`)
//! - **Never** writes to stdout/stderr
//! - **Never** calls `std::process::exit`
//! - **Never** assumes a terminal environment
//!
//! This means the same core could serve a TUI, a web endpoint, or any
//! other UI.
//!
//! ## Testing Strategy
//!
//! 1. **Core** (`state.rs`, `view.rs`, `io.rs`): Thorough unit tests of the
//!    mutation and derivation logic. This is where the lion's share of
//!    testing lives.
//!
//! 2. **API** (`api.rs`): Tests with `InMemoryPrefStore` verifying which
//!    operations persist the snapshot and that persistence failures are
//!    swallowed.
//!
//! 3. **CLI** (`main.rs` + `tests/`): Tests of line parsing, plus
//!    end-to-end sessions driven through the binary's stdin.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade—entry point for all operations
//! - [`state`]: The state container (`TableState`) and its mutations
//! - [`view`]: The filter → sort → paginate pipeline (`PageView`)
//! - [`io`]: CSV import with row validation, CSV export
//! - [`prefs`]: Preference persistence abstraction and implementations
//! - [`model`]: Core data types (`Record`, `Value`, `ColumnSpec`, `Theme`)
//! - [`error`]: Error types

pub mod api;
pub mod error;
pub mod io;
pub mod model;
pub mod prefs;
pub mod state;
pub mod view;
