//! # SwitchGear State
//!
//! Pluggable persistence for circuit breaker state:
//! - Current circuit state (closed / open / half-open)
//! - The ordered list of failures recorded since the last reset
//!
//! ## Stores
//!
//! - **Memory**: process-local, nothing is serialized (default)
//! - **Shared**: persists state and failures under namespaced keys through a
//!   [`StoreClient`], so several processes observe one logical circuit
//!
//! ## Clients
//!
//! - **InMemoryClient**: `DashMap`-backed client, shared within one process
//! - **RedisClient**: blocking Redis connection (feature `redis-backend`)
//!
//! ## Example
//!
//! ```rust
//! use switchgear_state::{CircuitState, FailureRecord, InMemoryClient, SharedStore, StateStore};
//!
//! fn main() -> switchgear_state::Result<()> {
//!     let store = SharedStore::new(InMemoryClient::new(), "payments:charge")?;
//!
//!     store.add_failure(FailureRecord::new("Timeout", "upstream took too long"))?;
//!     store.set_state(CircuitState::Closed)?;
//!
//!     assert_eq!(store.failure_count()?, 1);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

mod client;
mod config;
mod error;
mod failure;
mod memory;
mod shared;
mod state;
mod store;

#[cfg(feature = "redis-backend")]
mod redis_client;

pub use client::{InMemoryClient, StoreClient};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use failure::FailureRecord;
pub use memory::MemoryStore;
pub use shared::SharedStore;
pub use state::CircuitState;
pub use store::StateStore;

#[cfg(feature = "redis-backend")]
pub use redis_client::RedisClient;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{InMemoryClient, StoreClient};
    pub use crate::config::StoreConfig;
    pub use crate::error::{Error, Result};
    pub use crate::failure::FailureRecord;
    pub use crate::memory::MemoryStore;
    pub use crate::shared::SharedStore;
    pub use crate::state::CircuitState;
    pub use crate::store::StateStore;

    #[cfg(feature = "redis-backend")]
    pub use crate::redis_client::RedisClient;
}
