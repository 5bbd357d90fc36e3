//! # SwitchGear Breaker
//!
//! Circuit breaker around a caller-supplied operation:
//! - Counts failures and opens the circuit once a limit is reached
//! - Rejects calls while open, without invoking the operation
//! - Admits a single probe once the reset timeout has lapsed since the most
//!   recent failure; the probe closes or re-opens the circuit
//!
//! State lives in a [`StateStore`]: a process-local [`MemoryStore`] or a
//! [`SharedStore`] that lets several processes share one logical circuit.
//!
//! ## Example
//!
//! ```rust
//! use switchgear_breaker::{Breaker, CallError};
//! use std::time::Duration;
//!
//! fn fetch(handle: &str) -> Result<String, std::io::Error> {
//!     Ok(format!("tweets for {handle}"))
//! }
//!
//! fn main() -> switchgear_breaker::Result<()> {
//!     let breaker = Breaker::builder(fetch)
//!         .failure_limit(2)
//!         .reset_timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     match breaker.call("joe") {
//!         Ok(tweets) => println!("{tweets}"),
//!         Err(CallError::Open(open)) => println!("try again in {:?}", open.retry_after),
//!         Err(err) => println!("failed: {err}"),
//!     }
//!
//!     assert!(breaker.is_closed()?);
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

pub mod breaker;
pub mod builder;
pub mod config;
pub mod error;
pub mod kind;
pub mod logger;

pub use breaker::Breaker;
pub use builder::BreakerBuilder;
pub use config::BreakerConfig;
pub use error::{CallError, CircuitOpenError};
pub use kind::{ErrorKind, TypeNameKind};
pub use logger::{Logger, TracingLogger};

pub use switchgear_state as state;
pub use switchgear_state::{
    CircuitState, Error, FailureRecord, InMemoryClient, MemoryStore, Result, SharedStore,
    StateStore, StoreClient, StoreConfig,
};

#[cfg(feature = "redis-backend")]
pub use switchgear_state::RedisClient;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::breaker::Breaker;
    pub use crate::builder::BreakerBuilder;
    pub use crate::config::BreakerConfig;
    pub use crate::error::{CallError, CircuitOpenError};
    pub use crate::kind::{ErrorKind, TypeNameKind};
    pub use crate::logger::{Logger, TracingLogger};
    pub use switchgear_state::prelude::*;
}
