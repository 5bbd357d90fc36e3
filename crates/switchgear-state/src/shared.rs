//! Shared state store backed by a remote key/value client

use crate::{CircuitState, Error, FailureRecord, Result, StateStore, StoreClient};
use tracing::{debug, trace};

/// Prefix applied to every namespace
const KEY_PREFIX: &str = "circuit_breaker";

/// Shared state store
///
/// Persists the circuit under two keys, `circuit_breaker:<ns>:state` (scalar)
/// and `circuit_breaker:<ns>:failures` (list of JSON-encoded
/// [`FailureRecord`]s). Every breaker using the same client backend and
/// namespace observes one logical circuit.
///
/// Reads and writes are independent remote commands and are not
/// transactional; concurrent writers resolve last-writer-wins.
pub struct SharedStore<C> {
    client: C,
    namespace: String,
    state_key: String,
    failures_key: String,
}

impl<C> std::fmt::Debug for SharedStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStore")
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl<C: StoreClient> SharedStore<C> {
    /// Create a store for `namespace`
    ///
    /// Fails with [`Error::Config`] if the namespace is blank.
    pub fn new(client: C, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        if namespace.trim().is_empty() {
            return Err(Error::Config("Missing namespace".to_string()));
        }

        let prefix = format!("{KEY_PREFIX}:{namespace}");
        debug!(namespace = %namespace, "Shared store created");

        Ok(Self {
            client,
            state_key: format!("{prefix}:state"),
            failures_key: format!("{prefix}:failures"),
            namespace,
        })
    }

    /// Namespace as given at construction
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key holding the circuit state
    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    /// Key holding the failure list
    pub fn failures_key(&self) -> &str {
        &self.failures_key
    }

    /// Underlying client
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: StoreClient> StateStore for SharedStore<C> {
    fn state(&self) -> Result<CircuitState> {
        match self.client.get(&self.state_key)? {
            Some(raw) => raw.parse(),
            None => {
                trace!(key = %self.state_key, "No stored state, defaulting to closed");
                self.set_state(CircuitState::Closed)?;
                Ok(CircuitState::Closed)
            }
        }
    }

    fn set_state(&self, state: CircuitState) -> Result<()> {
        self.client.set(&self.state_key, state.as_str())
    }

    fn failures(&self) -> Result<Vec<FailureRecord>> {
        if self.client.list_len(&self.failures_key)? == 0 {
            self.set_failures(Vec::new())?;
            return Ok(Vec::new());
        }

        self.client
            .list(&self.failures_key)?
            .iter()
            .map(|raw| FailureRecord::from_json(raw))
            .collect()
    }

    fn set_failures(&self, failures: Vec<FailureRecord>) -> Result<()> {
        self.client.delete(&self.failures_key)?;
        for failure in &failures {
            self.client.push(&self.failures_key, &failure.to_json()?)?;
        }
        Ok(())
    }

    fn add_failure(&self, failure: FailureRecord) -> Result<()> {
        self.client.push(&self.failures_key, &failure.to_json()?)
    }

    fn failure_count(&self) -> Result<usize> {
        self.client.list_len(&self.failures_key)
    }

    fn most_recent_failure(&self) -> Result<Option<FailureRecord>> {
        self.client
            .last(&self.failures_key)?
            .map(|raw| FailureRecord::from_json(&raw))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockStoreClient;
    use crate::InMemoryClient;
    use chrono::{TimeZone, Utc};

    const STATE_KEY: &str = "circuit_breaker:service:state";
    const FAILURES_KEY: &str = "circuit_breaker:service:failures";

    fn failure() -> FailureRecord {
        FailureRecord::with_timestamp(
            "RemoteUnavailable",
            "Remote system unavailable",
            Utc.with_ymd_and_hms(2017, 2, 13, 23, 31, 31).unwrap(),
        )
    }

    #[test]
    fn test_requires_namespace() {
        let err = SharedStore::new(InMemoryClient::new(), "").unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("Missing namespace")));

        assert!(SharedStore::new(InMemoryClient::new(), "   ").is_err());
    }

    #[test]
    fn test_key_layout() {
        let store = SharedStore::new(InMemoryClient::new(), "service").unwrap();
        assert_eq!(store.state_key(), STATE_KEY);
        assert_eq!(store.failures_key(), FAILURES_KEY);
        assert_eq!(store.namespace(), "service");
    }

    #[test]
    fn test_state_read_from_client() {
        let mut client = MockStoreClient::new();
        client
            .expect_get()
            .withf(|key| key == STATE_KEY)
            .times(1)
            .returning(|_| Ok(Some("open".to_string())));

        let store = SharedStore::new(client, "service").unwrap();
        assert_eq!(store.state().unwrap(), CircuitState::Open);
    }

    #[test]
    fn test_state_defaults_to_closed_and_writes_back() {
        let mut client = MockStoreClient::new();
        client
            .expect_get()
            .withf(|key| key == STATE_KEY)
            .times(1)
            .returning(|_| Ok(None));
        client
            .expect_set()
            .withf(|key, value| key == STATE_KEY && value == "closed")
            .times(1)
            .returning(|_, _| Ok(()));

        let store = SharedStore::new(client, "service").unwrap();
        assert_eq!(store.state().unwrap(), CircuitState::Closed);
    }

    #[test]
    fn test_state_rejects_unknown_value() {
        let mut client = MockStoreClient::new();
        client
            .expect_get()
            .returning(|_| Ok(Some("ajar".to_string())));

        let store = SharedStore::new(client, "service").unwrap();
        assert!(matches!(store.state(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_set_state_writes_string_form() {
        let mut client = MockStoreClient::new();
        client
            .expect_set()
            .withf(|key, value| key == STATE_KEY && value == "half_open")
            .times(1)
            .returning(|_, _| Ok(()));

        let store = SharedStore::new(client, "service").unwrap();
        store.set_state(CircuitState::HalfOpen).unwrap();
    }

    #[test]
    fn test_failures_default_to_empty_and_clear_key() {
        let mut client = MockStoreClient::new();
        client
            .expect_list_len()
            .withf(|key| key == FAILURES_KEY)
            .times(1)
            .returning(|_| Ok(0));
        client
            .expect_delete()
            .withf(|key| key == FAILURES_KEY)
            .times(1)
            .returning(|_| Ok(()));
        client.expect_list().never();

        let store = SharedStore::new(client, "service").unwrap();
        assert!(store.failures().unwrap().is_empty());
    }

    #[test]
    fn test_failures_decoded_in_order() {
        let first = FailureRecord::new("A", "first").to_json().unwrap();
        let second = FailureRecord::new("B", "second").to_json().unwrap();

        let mut client = MockStoreClient::new();
        client.expect_list_len().returning(|_| Ok(2));
        client
            .expect_list()
            .withf(|key| key == FAILURES_KEY)
            .times(1)
            .returning(move |_| Ok(vec![first.clone(), second.clone()]));

        let store = SharedStore::new(client, "service").unwrap();
        let failures = store.failures().unwrap();

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].to_string(), "[A] - first");
        assert_eq!(failures[1].to_string(), "[B] - second");
    }

    #[test]
    fn test_add_failure_pushes_json() {
        let expected = failure().to_json().unwrap();

        let mut client = MockStoreClient::new();
        client
            .expect_push()
            .withf(move |key, value| key == FAILURES_KEY && value == expected)
            .times(1)
            .returning(|_, _| Ok(()));

        let store = SharedStore::new(client, "service").unwrap();
        store.add_failure(failure()).unwrap();
    }

    #[test]
    fn test_clearing_failures_deletes_key() {
        let mut client = MockStoreClient::new();
        client
            .expect_delete()
            .withf(|key| key == FAILURES_KEY)
            .times(1)
            .returning(|_| Ok(()));
        client.expect_push().never();

        let store = SharedStore::new(client, "service").unwrap();
        store.set_failures(Vec::new()).unwrap();
    }

    #[test]
    fn test_replacing_failures_deletes_then_pushes() {
        let mut seq = mockall::Sequence::new();
        let mut client = MockStoreClient::new();
        client
            .expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        client
            .expect_push()
            .withf(|key, _| key == FAILURES_KEY)
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let store = SharedStore::new(client, "service").unwrap();
        store
            .set_failures(vec![failure(), FailureRecord::new("B", "again")])
            .unwrap();
    }

    #[test]
    fn test_most_recent_failure_reads_tail() {
        let tail = failure().to_json().unwrap();

        let mut client = MockStoreClient::new();
        client
            .expect_last()
            .withf(|key| key == FAILURES_KEY)
            .times(1)
            .returning(move |_| Ok(Some(tail.clone())));

        let store = SharedStore::new(client, "service").unwrap();
        let recent = store.most_recent_failure().unwrap().unwrap();

        assert_eq!(recent, failure());
    }

    #[test]
    fn test_client_errors_propagate() {
        let mut client = MockStoreClient::new();
        client
            .expect_get()
            .returning(|_| Err(Error::Connection("connection refused".to_string())));

        let store = SharedStore::new(client, "service").unwrap();
        assert!(matches!(store.state(), Err(Error::Connection(_))));
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let client = InMemoryClient::new();
        let a = SharedStore::new(client.clone(), "a").unwrap();
        let b = SharedStore::new(client, "b").unwrap();

        a.add_failure(failure()).unwrap();
        a.set_state(CircuitState::Open).unwrap();

        assert_eq!(b.failure_count().unwrap(), 0);
        assert_eq!(b.state().unwrap(), CircuitState::Closed);
        assert_eq!(a.failure_count().unwrap(), 1);
        assert_eq!(a.state().unwrap(), CircuitState::Open);
    }

    #[test]
    fn test_reset_through_in_memory_client() {
        let client = InMemoryClient::new();
        let store = SharedStore::new(client.clone(), "service").unwrap();

        store.add_failure(failure()).unwrap();
        store.set_state(CircuitState::Open).unwrap();
        store.reset().unwrap();

        assert_eq!(store.state().unwrap(), CircuitState::Closed);
        assert!(store.failures().unwrap().is_empty());
        assert_eq!(client.list_len(FAILURES_KEY).unwrap(), 0);
        assert_eq!(client.get(STATE_KEY).unwrap(), Some("closed".to_string()));
    }
}
