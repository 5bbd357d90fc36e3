//! Configuration for state stores

use crate::{Error, MemoryStore, Result, StateStore};
use serde::{Deserialize, Serialize};

/// Store selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-memory store (default, single process only)
    #[default]
    Memory,

    /// Shared store on a Redis server (distributed)
    #[cfg(feature = "redis-backend")]
    Redis {
        /// Redis connection URL (redis://host:port or rediss:// for TLS)
        url: String,
    },
}

impl StoreConfig {
    /// Short name of the selected store kind
    pub fn kind(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            #[cfg(feature = "redis-backend")]
            StoreConfig::Redis { .. } => "redis",
        }
    }

    /// Whether the store is shared across processes and needs a namespace
    pub fn is_shared(&self) -> bool {
        !matches!(self, StoreConfig::Memory)
    }

    /// Open the configured store
    ///
    /// Shared stores require a non-blank namespace.
    #[cfg_attr(not(feature = "redis-backend"), allow(unused_variables))]
    pub fn open(&self, namespace: Option<&str>) -> Result<Box<dyn StateStore + Send + Sync>> {
        match self {
            StoreConfig::Memory => Ok(Box::new(MemoryStore::new())),
            #[cfg(feature = "redis-backend")]
            StoreConfig::Redis { url } => {
                let namespace =
                    namespace.ok_or_else(|| Error::Config("Missing namespace".to_string()))?;
                let client = crate::RedisClient::open(url)?;
                Ok(Box::new(crate::SharedStore::new(client, namespace)?))
            }
        }
    }

    /// Check the configuration without connecting
    pub fn validate(&self, namespace: Option<&str>) -> Result<()> {
        if self.is_shared() && namespace.map_or(true, |ns| ns.trim().is_empty()) {
            return Err(Error::Config(format!(
                "Missing namespace for {} store",
                self.kind()
            )));
        }

        #[cfg(feature = "redis-backend")]
        if let StoreConfig::Redis { url } = self {
            if url.is_empty() {
                return Err(Error::Config("Redis url cannot be empty".to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CircuitState;

    #[test]
    fn test_default_is_memory() {
        assert_eq!(StoreConfig::default(), StoreConfig::Memory);
        assert_eq!(StoreConfig::Memory.kind(), "memory");
        assert!(!StoreConfig::Memory.is_shared());
    }

    #[test]
    fn test_deserialize_memory() {
        let config: StoreConfig = serde_json::from_str(r#"{"type":"memory"}"#).unwrap();
        assert_eq!(config, StoreConfig::Memory);
    }

    #[test]
    fn test_open_memory() {
        let store = StoreConfig::Memory.open(None).unwrap();
        assert_eq!(store.state().unwrap(), CircuitState::Closed);
        assert_eq!(store.failure_count().unwrap(), 0);
    }

    #[test]
    fn test_memory_needs_no_namespace() {
        assert!(StoreConfig::Memory.validate(None).is_ok());
    }

    #[cfg(feature = "redis-backend")]
    #[test]
    fn test_redis_requires_namespace() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"type":"redis","url":"redis://127.0.0.1:6379"}"#).unwrap();

        assert!(config.is_shared());
        assert!(config.validate(None).unwrap_err().is_config());
        assert!(config.validate(Some("")).unwrap_err().is_config());
        assert!(config.validate(Some("svc")).is_ok());
    }
}
