//! Redis client implementation

use crate::{Error, Result, StoreClient};
use parking_lot::Mutex;
use redis::{Commands, Connection};
use tracing::{debug, trace};

/// Redis key/value client
///
/// Blocking client over a single connection; commands are serialized through
/// a mutex so the client can be shared between threads.
pub struct RedisClient {
    client: redis::Client,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("addr", &self.client.get_connection_info().addr)
            .finish()
    }
}

impl RedisClient {
    /// Connect to a Redis server
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| Error::Config(e.to_string()))?;

        let conn = client
            .get_connection()
            .map_err(|e| Error::Connection(e.to_string()))?;

        debug!(url, "Redis client connected");

        Ok(Self {
            client,
            conn: Mutex::new(conn),
        })
    }

    /// Check the server is reachable
    pub fn ping(&self) -> Result<()> {
        let response: String = redis::cmd("PING").query(&mut *self.conn.lock())?;

        if response == "PONG" {
            Ok(())
        } else {
            Err(Error::Backend("Unexpected PING response".to_string()))
        }
    }
}

impl StoreClient for RedisClient {
    fn get(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "Redis GET");
        Ok(self.conn.lock().get(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        trace!(key, value, "Redis SET");
        let _: () = self.conn.lock().set(key, value)?;
        Ok(())
    }

    fn push(&self, key: &str, value: &str) -> Result<()> {
        trace!(key, "Redis RPUSH");
        let _: () = self.conn.lock().rpush(key, value)?;
        Ok(())
    }

    fn list(&self, key: &str) -> Result<Vec<String>> {
        trace!(key, "Redis LRANGE");
        Ok(self.conn.lock().lrange(key, 0, -1)?)
    }

    fn list_len(&self, key: &str) -> Result<usize> {
        trace!(key, "Redis LLEN");
        Ok(self.conn.lock().llen(key)?)
    }

    fn last(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "Redis LINDEX -1");
        Ok(self.conn.lock().lindex(key, -1)?)
    }

    fn delete(&self, key: &str) -> Result<()> {
        trace!(key, "Redis DEL");
        let _: () = self.conn.lock().del(key)?;
        Ok(())
    }
}
