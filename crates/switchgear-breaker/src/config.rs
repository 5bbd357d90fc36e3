//! Breaker configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use switchgear_state::{Error, Result, StoreConfig};

/// Breaker configuration
///
/// The protected operation and the logger are not part of the serialized
/// configuration; they are handed to the [`BreakerBuilder`](crate::BreakerBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Failures tolerated before the circuit opens
    #[serde(default = "default_failure_limit")]
    pub failure_limit: usize,

    /// Time after the most recent failure before a probe call is admitted
    #[serde(default = "default_reset_timeout", with = "humantime_serde")]
    pub reset_timeout: Duration,

    /// Key prefix isolating this circuit in a shared store
    #[serde(default)]
    pub namespace: Option<String>,

    /// Where state and failures are kept
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_limit: default_failure_limit(),
            reset_timeout: default_reset_timeout(),
            namespace: None,
            store: StoreConfig::default(),
        }
    }
}

impl BreakerConfig {
    /// Validate limits and store requirements
    pub fn validate(&self) -> Result<()> {
        self.validate_limits()?;
        self.store.validate(self.namespace.as_deref())
    }

    /// Validate the failure limit and reset timeout only
    pub fn validate_limits(&self) -> Result<()> {
        if self.failure_limit == 0 {
            return Err(Error::Config("failure_limit must be > 0".to_string()));
        }

        if self.reset_timeout.is_zero() {
            return Err(Error::Config("reset_timeout must be > 0".to_string()));
        }

        if self.reset_timeout > Duration::from_secs(3600) {
            tracing::warn!(
                reset_timeout_secs = self.reset_timeout.as_secs(),
                "reset_timeout is very high (>1 hour)"
            );
        }

        Ok(())
    }
}

fn default_failure_limit() -> usize {
    5
}

fn default_reset_timeout() -> Duration {
    Duration::from_secs(10)
}
