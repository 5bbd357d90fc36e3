//! In-memory state store implementation

use crate::{CircuitState, FailureRecord, Result, StateStore};
use parking_lot::{Mutex, RwLock};
use tracing::trace;

/// In-memory state store
///
/// Holds the state and failure list directly; nothing is serialized and
/// nothing outlives the process. Each field has its own lock, held only for
/// the duration of a single read or write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<CircuitState>,
    failures: Mutex<Vec<FailureRecord>>,
}

impl MemoryStore {
    /// Create a closed store with no failures
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn state(&self) -> Result<CircuitState> {
        Ok(*self.state.read())
    }

    fn set_state(&self, state: CircuitState) -> Result<()> {
        trace!(%state, "Memory SET state");
        *self.state.write() = state;
        Ok(())
    }

    fn failures(&self) -> Result<Vec<FailureRecord>> {
        Ok(self.failures.lock().clone())
    }

    fn set_failures(&self, failures: Vec<FailureRecord>) -> Result<()> {
        trace!(count = failures.len(), "Memory REPLACE failures");
        *self.failures.lock() = failures;
        Ok(())
    }

    fn add_failure(&self, failure: FailureRecord) -> Result<()> {
        trace!(%failure, "Memory APPEND failure");
        self.failures.lock().push(failure);
        Ok(())
    }

    fn failure_count(&self) -> Result<usize> {
        Ok(self.failures.lock().len())
    }

    fn most_recent_failure(&self) -> Result<Option<FailureRecord>> {
        Ok(self.failures.lock().last().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed_and_empty() {
        let store = MemoryStore::new();

        assert_eq!(store.state().unwrap(), CircuitState::Closed);
        assert!(store.failures().unwrap().is_empty());
        assert_eq!(store.failure_count().unwrap(), 0);
        assert!(store.most_recent_failure().unwrap().is_none());
    }

    #[test]
    fn test_add_failure_appends_in_order() {
        let store = MemoryStore::new();

        store.add_failure(FailureRecord::new("A", "first")).unwrap();
        store.add_failure(FailureRecord::new("B", "second")).unwrap();

        let failures = store.failures().unwrap();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].error_kind(), "A");
        assert_eq!(failures[1].error_kind(), "B");
        assert_eq!(store.most_recent_failure().unwrap().unwrap().message(), "second");
    }

    #[test]
    fn test_set_failures_replaces() {
        let store = MemoryStore::new();
        store.add_failure(FailureRecord::new("A", "old")).unwrap();

        store
            .set_failures(vec![FailureRecord::new("B", "new")])
            .unwrap();

        let failures = store.failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message(), "new");
    }

    #[test]
    fn test_reset() {
        let store = MemoryStore::new();
        store.add_failure(FailureRecord::new("A", "boom")).unwrap();
        store.set_state(CircuitState::Open).unwrap();

        store.reset().unwrap();

        assert_eq!(store.state().unwrap(), CircuitState::Closed);
        assert_eq!(store.failure_count().unwrap(), 0);
    }
}
