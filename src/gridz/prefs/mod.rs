//! # Preference Layer
//!
//! Display preferences outlive a session; records do not. This module
//! defines the [`PrefStore`] trait the API facade persists through.
//!
//! ## Design Rationale
//!
//! Persistence is abstracted behind a trait to:
//! - Enable **testing** with `InMemoryPrefStore` (no filesystem needed)
//! - Keep the facade's save/restore policy **decoupled** from where the
//!   snapshot actually lives
//!
//! ## Implementations
//!
//! - [`file::FilePrefStore`]: Production storage, one JSON document at a
//!   fixed path (platform data directory by default)
//! - [`memory::InMemoryPrefStore`]: In-memory storage for testing, with
//!   corrupt-payload injection and write-failure simulation
//!
//! ## What a snapshot holds
//!
//! Exactly the presentation-shaped subset of table state: the column
//! set (order, visibility, widths, flags), the theme, and the page
//! size. Records, search terms, sort choices, and edit marks are
//! session-local and never serialized.

use crate::error::Result;
use crate::model::{ColumnSpec, Theme};
use serde::{Deserialize, Serialize};

pub mod file;
pub mod memory;

pub use file::FilePrefStore;
pub use memory::InMemoryPrefStore;

/// The persisted slice of table state.
///
/// Deserialization is lenient about column members (absent flags fall
/// back to the [`ColumnSpec`] serde defaults) but strict about the
/// three top-level members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub columns: Vec<ColumnSpec>,
    pub theme: Theme,
    pub page_size: usize,
}

/// Abstract interface for preference persistence.
pub trait PrefStore {
    /// Load the saved snapshot, if any.
    ///
    /// `Ok(None)` means "start from defaults": either nothing was ever
    /// saved or the stored payload is unreadable. Implementations log
    /// unreadable payloads and do not propagate them as errors.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Persist a snapshot, replacing any previous one.
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;
}
