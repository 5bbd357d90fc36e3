//! Circuit breaker state machine

use crate::builder::BreakerBuilder;
use crate::error::{CallError, CircuitOpenError};
use crate::kind::{ErrorKind, TypeNameKind};
use crate::logger::Logger;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use switchgear_state::{CircuitState, FailureRecord, MemoryStore, Result, StateStore};

/// Circuit breaker around a protected operation
///
/// | From | Trigger | To |
/// |---|---|---|
/// | Closed | failure, count < limit | Closed |
/// | Closed | failure, count ≥ limit | Open |
/// | Open | reset timeout not yet lapsed | Open (calls rejected) |
/// | Open | reset timeout lapsed | HalfOpen (next call admitted) |
/// | HalfOpen | call succeeds | Closed (failures cleared) |
/// | HalfOpen | call fails | Open |
///
/// The breaker runs the operation on the caller's thread and keeps no state
/// of its own; every decision reads from and writes to the [`StateStore`].
/// `K` names recorded failures (see [`ErrorKind`]).
pub struct Breaker<F, S = MemoryStore, K = TypeNameKind> {
    circuit: F,
    store: S,
    failure_limit: usize,
    reset_timeout: Duration,
    logger: Arc<dyn Logger>,
    error_kind: K,
}

impl<F> Breaker<F, MemoryStore> {
    /// Start building a breaker around `circuit`
    pub fn builder(circuit: F) -> BreakerBuilder<F> {
        BreakerBuilder::new(circuit)
    }
}

impl<F, S: StateStore, K> Breaker<F, S, K> {
    pub(crate) fn from_parts(
        circuit: F,
        store: S,
        failure_limit: usize,
        reset_timeout: Duration,
        logger: Arc<dyn Logger>,
        error_kind: K,
    ) -> Self {
        Self {
            circuit,
            store,
            failure_limit,
            reset_timeout,
            logger,
            error_kind,
        }
    }

    /// Call the protected operation if the circuit allows it
    ///
    /// An open circuit whose reset timeout has lapsed moves to half-open and
    /// admits this call as a probe. A still-open circuit rejects the call with
    /// [`CallError::Open`] without invoking the operation.
    ///
    /// A success clears all failures and closes the circuit. A failure is
    /// recorded and then returned as [`CallError::Operation`]; it opens the
    /// circuit when the limit is reached, or immediately when the call was a
    /// half-open probe.
    pub fn call<A, T, E>(&self, args: A) -> std::result::Result<T, CallError<E>>
    where
        F: Fn(A) -> std::result::Result<T, E>,
        E: fmt::Display,
        K: ErrorKind<E>,
    {
        if let Some(retry_after) = self.logged(self.check_reset_timeout())? {
            let failure_count = self.logged(self.store.failure_count())?;
            self.logger.debug("Circuit open, call rejected");
            return Err(CircuitOpenError {
                failure_count,
                retry_after,
            }
            .into());
        }

        match (self.circuit)(args) {
            Ok(value) => {
                self.logged(self.reset_failures())?;
                Ok(value)
            }
            Err(err) => {
                self.logged(self.handle_failure(&err))?;
                Err(CallError::Operation(err))
            }
        }
    }

    /// Number of failures recorded since the last reset
    pub fn failure_count(&self) -> Result<usize> {
        self.store.failure_count()
    }

    /// All failures recorded since the last reset, oldest first
    pub fn failures(&self) -> Result<Vec<FailureRecord>> {
        self.store.failures()
    }

    /// The latest recorded failure
    pub fn most_recent_failure(&self) -> Result<Option<FailureRecord>> {
        self.store.most_recent_failure()
    }

    /// Current circuit state
    pub fn state(&self) -> Result<CircuitState> {
        self.store.state()
    }

    /// Whether the circuit is open
    pub fn is_open(&self) -> Result<bool> {
        Ok(self.state()? == CircuitState::Open)
    }

    /// Whether the circuit is closed
    pub fn is_closed(&self) -> Result<bool> {
        Ok(self.state()? == CircuitState::Closed)
    }

    /// Whether the circuit is half-open
    pub fn is_half_open(&self) -> Result<bool> {
        Ok(self.state()? == CircuitState::HalfOpen)
    }

    /// Clear all failures and close the circuit
    pub fn reset(&self) -> Result<()> {
        self.store.reset()?;
        self.logger.info("Circuit reset");
        Ok(())
    }

    /// Failures tolerated before the circuit opens
    pub fn failure_limit(&self) -> usize {
        self.failure_limit
    }

    /// Time after the most recent failure before a probe is admitted
    pub fn reset_timeout(&self) -> Duration {
        self.reset_timeout
    }

    /// The backing state store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Move an open circuit to half-open once the reset timeout has lapsed
    ///
    /// Returns the remaining wait if the circuit stays open.
    fn check_reset_timeout(&self) -> Result<Option<Duration>> {
        if self.store.state()? != CircuitState::Open {
            return Ok(None);
        }

        let remaining = match self.store.most_recent_failure()? {
            Some(failure) => self.remaining_timeout(failure.timestamp()),
            None => Duration::ZERO,
        };

        if !remaining.is_zero() {
            return Ok(Some(remaining));
        }

        self.store.set_state(CircuitState::HalfOpen)?;
        self.logger.debug("Circuit half-open, admitting probe call");
        Ok(None)
    }

    fn remaining_timeout(&self, last_failure: DateTime<Utc>) -> Duration {
        // A timestamp in the future (clock skew) counts as no time elapsed.
        let elapsed = (Utc::now() - last_failure)
            .to_std()
            .unwrap_or(Duration::ZERO);
        self.reset_timeout.saturating_sub(elapsed)
    }

    fn reset_failures(&self) -> Result<()> {
        self.store.set_failures(Vec::new())?;
        self.store.set_state(CircuitState::Closed)?;
        self.logger.info("Circuit closed");
        Ok(())
    }

    fn handle_failure<E>(&self, err: &E) -> Result<()>
    where
        E: fmt::Display,
        K: ErrorKind<E>,
    {
        let failure = FailureRecord::new(self.error_kind.error_kind(err), err.to_string());
        let rendered = failure.to_string();
        self.store.add_failure(failure)?;
        self.logger.warn(&rendered);

        let state = self.store.state()?;
        if state == CircuitState::HalfOpen || self.store.failure_count()? >= self.failure_limit {
            self.store.set_state(CircuitState::Open)?;
            if state != CircuitState::Open {
                self.logger.warn("Circuit opened");
            }
        } else {
            self.store.set_state(CircuitState::Closed)?;
        }
        Ok(())
    }

    /// Report a store error through the logger before it propagates
    fn logged<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.logger.error(&format!("State store error: {err}"));
        }
        result
    }
}

impl<F, S: fmt::Debug, K> fmt::Debug for Breaker<F, S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Breaker")
            .field("store", &self.store)
            .field("failure_limit", &self.failure_limit)
            .field("reset_timeout", &self.reset_timeout)
            .finish()
    }
}
