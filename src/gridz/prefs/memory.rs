use super::{PrefStore, Snapshot};
use crate::error::{GridzError, Result};
use tracing::warn;

/// In-memory preference storage for testing.
///
/// Holds the serialized payload rather than a parsed snapshot so tests
/// can inject corrupt payloads and exercise the same tolerant-load path
/// the file store takes.
#[derive(Debug, Default)]
pub struct InMemoryPrefStore {
    payload: Option<String>,
    fail_writes: bool,
}

impl InMemoryPrefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw payload, valid or not.
    pub fn with_raw(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            fail_writes: false,
        }
    }

    /// Make subsequent saves fail, for error-handling tests.
    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.fail_writes = simulate;
    }

    /// The stored payload, if any.
    pub fn raw(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

impl PrefStore for InMemoryPrefStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let Some(payload) = &self.payload else {
            return Ok(None);
        };
        match serde_json::from_str(payload) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!("ignoring unreadable preferences payload: {}", e);
                Ok(None)
            }
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        if self.fail_writes {
            return Err(GridzError::Io(std::io::Error::other(
                "Simulated write error",
            )));
        }
        self.payload = Some(serde_json::to_string_pretty(snapshot).map_err(GridzError::Serialization)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Theme, default_columns};

    fn sample() -> Snapshot {
        Snapshot {
            columns: default_columns(),
            theme: Theme::Light,
            page_size: 10,
        }
    }

    #[test]
    fn empty_store_loads_as_none() {
        assert_eq!(InMemoryPrefStore::new().load().unwrap(), None);
    }

    #[test]
    fn round_trips_a_snapshot() {
        let mut store = InMemoryPrefStore::new();
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
    }

    #[test]
    fn corrupt_payload_loads_as_none() {
        let store = InMemoryPrefStore::with_raw("][ definitely not json");
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn simulated_write_errors_surface() {
        let mut store = InMemoryPrefStore::new();
        store.set_simulate_write_error(true);
        assert!(store.save(&sample()).is_err());
        assert_eq!(store.raw(), None);
    }
}
