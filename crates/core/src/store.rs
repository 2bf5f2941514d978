//! Shared key-value store with expiry.
//!
//! The CSRF token store, de-dup cache and rate-limit counters all sit on this
//! interface. The in-memory store covers the single-process deployment; the
//! Redis store is the drop-in for running more than one instance. Check-then-
//! act sequences are atomic per call: the memory store holds one lock across
//! the whole operation, the Redis store runs a Lua script.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Outcome of one fixed-window rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDecision {
    pub allowed: bool,
    /// Requests counted in the current window, including this one when allowed.
    pub count: u32,
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;
    /// Atomically read and delete. The basis for single-use tokens.
    async fn take(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
    /// Fixed-window counter: a fresh window starts at 1; within a window the
    /// counter increments up to `limit`; once at the limit further hits are
    /// denied without incrementing.
    async fn fixed_window_hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<WindowDecision, StoreError>;
}

struct ValueEntry {
    value: String,
    expires_at: Instant,
}

struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

#[derive(Default)]
struct MemoryInner {
    values: HashMap<String, ValueEntry>,
    windows: HashMap<String, WindowEntry>,
}

/// Process-local store. Entries are evicted lazily on lookup.
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryInner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.values.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                inner.values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.values.insert(
            key.to_string(),
            ValueEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.values.remove(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value)),
            _ => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.values.remove(key);
        Ok(())
    }

    async fn fixed_window_hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<WindowDecision, StoreError> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        let entry = inner.windows.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            reset_at: now + window,
        });
        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + window;
        }
        if entry.count >= limit {
            return Ok(WindowDecision {
                allowed: false,
                count: entry.count,
            });
        }
        entry.count += 1;
        Ok(WindowDecision {
            allowed: true,
            count: entry.count,
        })
    }
}

const TAKE_SCRIPT: &str = r#"
local value = redis.call('GET', KEYS[1])
if value then
  redis.call('DEL', KEYS[1])
end
return value
"#;

const FIXED_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local limit = tonumber(ARGV[1])
local window = tonumber(ARGV[2])

local count = tonumber(redis.call('GET', key) or '0')
if count >= limit then
  return {0, count}
end

count = redis.call('INCR', key)
if count == 1 then
  redis.call('EXPIRE', key, window)
end
return {1, count}
"#;

/// Redis-backed store for multi-instance deployments. Same contract as
/// [`MemoryStore`]; window and TTL state live in Redis so all instances see
/// the same counters.
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn open(url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: redis::Client::open(url)?,
        })
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn().await?;
        let value: Option<String> = redis::AsyncCommands::get(&mut conn, key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let secs = ttl.as_secs().max(1);
        redis::AsyncCommands::set_ex::<_, _, ()>(&mut conn, key, value, secs).await?;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn().await?;
        let value: Option<String> = redis::Script::new(TAKE_SCRIPT)
            .key(key)
            .invoke_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        redis::AsyncCommands::del::<_, ()>(&mut conn, key).await?;
        Ok(())
    }

    async fn fixed_window_hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<WindowDecision, StoreError> {
        let mut conn = self.conn().await?;
        let (allowed, count): (i64, i64) = redis::Script::new(FIXED_WINDOW_SCRIPT)
            .key(key)
            .arg(limit)
            .arg(window.as_secs().max(1))
            .invoke_async(&mut conn)
            .await?;
        Ok(WindowDecision {
            allowed: allowed == 1,
            count: count as u32,
        })
    }
}
