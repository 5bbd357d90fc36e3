//! State store trait definition

use crate::{CircuitState, FailureRecord, Result};
use std::sync::Arc;

/// State store trait
///
/// Persistence for a breaker's mutable state: the current [`CircuitState`]
/// and the ordered list of failures since the last reset. Stores use interior
/// mutability so a breaker can be driven through a shared reference.
///
/// Reads and writes are independent operations. No store holds a lock across
/// a read-decide-write sequence, so concurrent callers may observe a
/// transiently inconsistent view.
pub trait StateStore {
    /// Current circuit state
    fn state(&self) -> Result<CircuitState>;

    /// Overwrite the circuit state
    fn set_state(&self, state: CircuitState) -> Result<()>;

    /// All recorded failures, oldest first
    fn failures(&self) -> Result<Vec<FailureRecord>>;

    /// Replace the failure list
    fn set_failures(&self, failures: Vec<FailureRecord>) -> Result<()>;

    /// Append one failure
    fn add_failure(&self, failure: FailureRecord) -> Result<()>;

    /// Number of recorded failures
    fn failure_count(&self) -> Result<usize> {
        Ok(self.failures()?.len())
    }

    /// The latest recorded failure, if any
    fn most_recent_failure(&self) -> Result<Option<FailureRecord>> {
        Ok(self.failures()?.pop())
    }

    /// Clear all failures and close the circuit
    fn reset(&self) -> Result<()> {
        self.set_failures(Vec::new())?;
        self.set_state(CircuitState::Closed)
    }
}

impl<S: StateStore + ?Sized> StateStore for Arc<S> {
    fn state(&self) -> Result<CircuitState> {
        (**self).state()
    }

    fn set_state(&self, state: CircuitState) -> Result<()> {
        (**self).set_state(state)
    }

    fn failures(&self) -> Result<Vec<FailureRecord>> {
        (**self).failures()
    }

    fn set_failures(&self, failures: Vec<FailureRecord>) -> Result<()> {
        (**self).set_failures(failures)
    }

    fn add_failure(&self, failure: FailureRecord) -> Result<()> {
        (**self).add_failure(failure)
    }

    fn failure_count(&self) -> Result<usize> {
        (**self).failure_count()
    }

    fn most_recent_failure(&self) -> Result<Option<FailureRecord>> {
        (**self).most_recent_failure()
    }

    fn reset(&self) -> Result<()> {
        (**self).reset()
    }
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn state(&self) -> Result<CircuitState> {
        (**self).state()
    }

    fn set_state(&self, state: CircuitState) -> Result<()> {
        (**self).set_state(state)
    }

    fn failures(&self) -> Result<Vec<FailureRecord>> {
        (**self).failures()
    }

    fn set_failures(&self, failures: Vec<FailureRecord>) -> Result<()> {
        (**self).set_failures(failures)
    }

    fn add_failure(&self, failure: FailureRecord) -> Result<()> {
        (**self).add_failure(failure)
    }

    fn failure_count(&self) -> Result<usize> {
        (**self).failure_count()
    }

    fn most_recent_failure(&self) -> Result<Option<FailureRecord>> {
        (**self).most_recent_failure()
    }

    fn reset(&self) -> Result<()> {
        (**self).reset()
    }
}
