//! Errors surfaced by [`Breaker::call`](crate::Breaker::call)

use std::time::Duration;

/// The circuit is open; the protected operation was not invoked
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Circuit breaker is open after {failure_count} failures (retry after {retry_after:?})")]
pub struct CircuitOpenError {
    /// Failures recorded when the call was rejected
    pub failure_count: usize,
    /// Time left until a probe call will be admitted
    pub retry_after: Duration,
}

/// Error returned by a breaker call
#[derive(Debug, thiserror::Error)]
pub enum CallError<E> {
    /// Rejected without invoking the operation
    #[error(transparent)]
    Open(#[from] CircuitOpenError),

    /// The operation ran and failed; the failure has been recorded
    #[error("{0}")]
    Operation(E),

    /// The state store could not be read or written
    #[error("State store error: {0}")]
    Store(#[from] switchgear_state::Error),
}

impl<E> CallError<E> {
    /// Whether the call was rejected by an open circuit
    pub fn is_open(&self) -> bool {
        matches!(self, CallError::Open(_))
    }

    /// The operation's own error, if it ran and failed
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            CallError::Operation(err) => Some(err),
            _ => None,
        }
    }

    /// Consume into the operation's own error, if it ran and failed
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            CallError::Operation(err) => Some(err),
            _ => None,
        }
    }

    /// Time until a probe is admitted, if the call was rejected
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CallError::Open(open) => Some(open.retry_after),
            _ => None,
        }
    }
}
