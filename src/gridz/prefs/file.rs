use super::{PrefStore, Snapshot};
use crate::error::{GridzError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File-backed preference storage: one pretty-printed JSON document.
pub struct FilePrefStore {
    path: PathBuf,
}

impl FilePrefStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The platform-conventional location for the preferences file,
    /// e.g. `~/.local/share/gridz/preferences.json` on Linux. `None`
    /// when no home directory can be determined.
    pub fn default_location() -> Option<PathBuf> {
        ProjectDirs::from("com", "gridz", "gridz")
            .map(|dirs| dirs.data_dir().join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(GridzError::Io)?;
        }
        Ok(())
    }
}

impl PrefStore for FilePrefStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(GridzError::Io)?;
        match serde_json::from_str(&content) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                // A mangled file should not block startup
                warn!(
                    "ignoring unreadable preferences at {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.ensure_parent()?;
        let content = serde_json::to_string_pretty(snapshot).map_err(GridzError::Serialization)?;
        fs::write(&self.path, content).map_err(GridzError::Io)?;
        Ok(())
    }
}
