//! Remote key/value client trait and the in-process implementation

use crate::{Error, Result};
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Key/value client consumed by [`SharedStore`](crate::SharedStore)
///
/// The minimum command set a remote backend must offer: a scalar key for the
/// circuit state and an ordered collection for the failure list.
#[cfg_attr(test, mockall::automock)]
pub trait StoreClient {
    /// Get a scalar value (`GET`)
    ///
    /// Returns `None` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a scalar value (`SET`)
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Append to a list, creating it if needed (`RPUSH`)
    fn push(&self, key: &str, value: &str) -> Result<()>;

    /// All list elements in insertion order (`LRANGE key 0 -1`)
    ///
    /// A missing key reads as an empty list.
    fn list(&self, key: &str) -> Result<Vec<String>>;

    /// List length (`LLEN`); a missing key has length zero
    fn list_len(&self, key: &str) -> Result<usize> {
        Ok(self.list(key)?.len())
    }

    /// Last list element (`LINDEX key -1`)
    fn last(&self, key: &str) -> Result<Option<String>> {
        Ok(self.list(key)?.pop())
    }

    /// Delete a key of any type (`DEL`)
    ///
    /// Returns Ok(()) whether the key existed or not.
    fn delete(&self, key: &str) -> Result<()>;
}

impl<C: StoreClient + ?Sized> StoreClient for Arc<C> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn push(&self, key: &str, value: &str) -> Result<()> {
        (**self).push(key, value)
    }

    fn list(&self, key: &str) -> Result<Vec<String>> {
        (**self).list(key)
    }

    fn list_len(&self, key: &str) -> Result<usize> {
        (**self).list_len(key)
    }

    fn last(&self, key: &str) -> Result<Option<String>> {
        (**self).last(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

/// Value held under one key
#[derive(Debug, Clone)]
enum Entry {
    Scalar(String),
    List(Vec<String>),
}

/// In-process key/value client
///
/// Clones share the same map, so every [`SharedStore`](crate::SharedStore)
/// built from clones of one client observes the same circuits. Type rules
/// follow Redis: list commands against a scalar key (and vice versa) fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClient {
    store: Arc<DashMap<String, Entry>>,
}

impl InMemoryClient {
    /// Create an empty client
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no keys are held
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Remove every key
    pub fn flush(&self) {
        debug!("InMemory FLUSH - clearing all keys");
        self.store.clear();
    }

    fn wrong_type(key: &str) -> Error {
        Error::Backend(format!(
            "WRONGTYPE Operation against key '{key}' holding the wrong kind of value"
        ))
    }

    fn with_list<T>(&self, key: &str, f: impl FnOnce(&[String]) -> T) -> Result<T> {
        match self.store.get(key).as_deref() {
            None => Ok(f(&[])),
            Some(Entry::List(items)) => Ok(f(items)),
            Some(Entry::Scalar(_)) => Err(Self::wrong_type(key)),
        }
    }
}

impl StoreClient for InMemoryClient {
    fn get(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "InMemory GET");

        match self.store.get(key).as_deref() {
            None => Ok(None),
            Some(Entry::Scalar(value)) => Ok(Some(value.clone())),
            Some(Entry::List(_)) => Err(Self::wrong_type(key)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        trace!(key, value, "InMemory SET");

        self.store
            .insert(key.to_string(), Entry::Scalar(value.to_string()));
        Ok(())
    }

    fn push(&self, key: &str, value: &str) -> Result<()> {
        trace!(key, "InMemory RPUSH");

        match self.store.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) => match occupied.get_mut() {
                Entry::List(items) => {
                    items.push(value.to_string());
                    Ok(())
                }
                Entry::Scalar(_) => Err(Self::wrong_type(key)),
            },
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::List(vec![value.to_string()]));
                Ok(())
            }
        }
    }

    fn list(&self, key: &str) -> Result<Vec<String>> {
        trace!(key, "InMemory LRANGE");
        self.with_list(key, |items| items.to_vec())
    }

    fn list_len(&self, key: &str) -> Result<usize> {
        trace!(key, "InMemory LLEN");
        self.with_list(key, |items| items.len())
    }

    fn last(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "InMemory LINDEX -1");
        self.with_list(key, |items| items.last().cloned())
    }

    fn delete(&self, key: &str) -> Result<()> {
        trace!(key, "InMemory DEL");
        self.store.remove(key);
        Ok(())
    }
}
