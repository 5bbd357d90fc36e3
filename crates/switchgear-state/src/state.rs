//! Circuit state

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls pass through; failures accumulate below the limit
    #[default]
    Closed,
    /// Calls are rejected without invoking the protected operation
    Open,
    /// The reset timeout lapsed; the next call is admitted as a probe
    HalfOpen,
}

impl CircuitState {
    /// String form used when the state is persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "closed" => Ok(CircuitState::Closed),
            "open" => Ok(CircuitState::Open),
            "half_open" => Ok(CircuitState::HalfOpen),
            other => Err(Error::InvalidState(other.to_string())),
        }
    }
}
