//! Breaker builder

use crate::breaker::Breaker;
use crate::config::BreakerConfig;
use crate::kind::TypeNameKind;
use crate::logger::{Logger, TracingLogger};
use std::sync::Arc;
use std::time::Duration;
use switchgear_state::{Error, MemoryStore, Result, SharedStore, StateStore, StoreClient};

/// Builder for constructing a [`Breaker`]
///
/// The protected operation is required up front. Limits default to five
/// failures and a ten second reset timeout; the logger defaults to a
/// [`TracingLogger`] tagged with the namespace, and failures are named after
/// the error type ([`TypeNameKind`]).
pub struct BreakerBuilder<F, K = TypeNameKind> {
    circuit: F,
    config: BreakerConfig,
    logger: Option<Arc<dyn Logger>>,
    error_kind: K,
}

impl<F, K> std::fmt::Debug for BreakerBuilder<F, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerBuilder")
            .field("config", &self.config)
            .field("custom_logger", &self.logger.is_some())
            .finish()
    }
}

impl<F> BreakerBuilder<F> {
    /// Create a builder around `circuit`
    pub fn new(circuit: F) -> Self {
        Self {
            circuit,
            config: BreakerConfig::default(),
            logger: None,
            error_kind: TypeNameKind,
        }
    }
}

impl<F, K> BreakerBuilder<F, K> {
    /// Replace limits, namespace and store selection with `config`
    pub fn config(mut self, config: BreakerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of failures tolerated before the circuit opens
    pub fn failure_limit(mut self, limit: usize) -> Self {
        self.config.failure_limit = limit;
        self
    }

    /// Set the time after the most recent failure before a probe is admitted
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.config.reset_timeout = timeout;
        self
    }

    /// Set the namespace (required for shared stores)
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = Some(namespace.into());
        self
    }

    /// Set the logger
    pub fn logger<L: Logger + 'static>(self, logger: L) -> Self {
        self.shared_logger(Arc::new(logger))
    }

    /// Set a logger shared with other components
    pub fn shared_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set how recorded failures are named
    ///
    /// Accepts any [`ErrorKind`](crate::ErrorKind), typically a closure
    /// `|err: &E| -> String`. Operations returning `Box<dyn Error>` or
    /// `anyhow::Error` need this to record the concrete failure kind.
    pub fn error_kind<K2>(self, error_kind: K2) -> BreakerBuilder<F, K2> {
        BreakerBuilder {
            circuit: self.circuit,
            config: self.config,
            logger: self.logger,
            error_kind,
        }
    }

    /// Build a breaker on a process-local [`MemoryStore`]
    ///
    /// Fails with [`Error::Config`] when the configuration selects a shared
    /// store; use [`build_from_config`](Self::build_from_config) for that.
    pub fn build(self) -> Result<Breaker<F, MemoryStore, K>> {
        if self.config.store.is_shared() {
            return Err(Error::Config(format!(
                "{} store selected in config; use build_from_config",
                self.config.store.kind()
            )));
        }
        self.build_with_store(MemoryStore::new())
    }

    /// Build a breaker on a [`SharedStore`] over `client`
    ///
    /// Fails with [`Error::Config`] when no namespace has been set.
    pub fn build_shared<C: StoreClient>(
        self,
        client: C,
    ) -> Result<Breaker<F, SharedStore<C>, K>> {
        let namespace = self
            .config
            .namespace
            .clone()
            .ok_or_else(|| Error::Config("Missing namespace".to_string()))?;
        let store = SharedStore::new(client, namespace)?;
        self.build_with_store(store)
    }

    /// Build a breaker on the store selected by the configuration
    pub fn build_from_config(self) -> Result<Breaker<F, Box<dyn StateStore + Send + Sync>, K>> {
        self.config.validate()?;
        let store = self.config.store.open(self.config.namespace.as_deref())?;
        self.build_with_store(store)
    }

    /// Build a breaker on any [`StateStore`]
    pub fn build_with_store<S: StateStore>(self, store: S) -> Result<Breaker<F, S, K>> {
        self.config.validate_limits()?;

        let BreakerConfig {
            failure_limit,
            reset_timeout,
            namespace,
            ..
        } = self.config;

        let logger: Arc<dyn Logger> = match self.logger {
            Some(logger) => logger,
            None => Arc::new(
                namespace.map_or_else(TracingLogger::new, TracingLogger::with_namespace),
            ),
        };

        Ok(Breaker::from_parts(
            self.circuit,
            store,
            failure_limit,
            reset_timeout,
            logger,
            self.error_kind,
        ))
    }
}
