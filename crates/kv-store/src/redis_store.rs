use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{RedisResult, Value, aio::ConnectionManager};

use crate::{
    Result, StoreError,
    store::{KeyValueStore, ScanPage, WriteBatch, WriteCommand},
};

const DEFAULT_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`RedisKeyValueStore`].
///
/// Reads from environment variables:
/// - `REDIS_URL` — connection string (default: `"redis://127.0.0.1:6379"`)
/// - `REDIS_COMMAND_TIMEOUT_MS` — per-command deadline in milliseconds (default: `5000`)
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub command_timeout: Duration,
}

impl RedisConfig {
    /// Creates a config for `url` with the default command timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_URL.to_string()),
            command_timeout: std::env::var("REDIS_COMMAND_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_COMMAND_TIMEOUT),
        }
    }

    /// Sets the per-command deadline.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// Redis-backed key-value store implementation.
///
/// Holds a [`ConnectionManager`], which multiplexes one reconnecting
/// connection and is cheap to clone, so the store can be shared freely
/// between concurrent callers.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    conn: ConnectionManager,
    command_timeout: Duration,
}

impl RedisKeyValueStore {
    /// Connects to Redis using `config`.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = tokio::time::timeout(config.command_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Timeout {
                operation: "CONNECT",
                after: config.command_timeout,
            })??;

        tracing::debug!(url = %config.url, "connected to Redis");
        Ok(Self::new(conn, config.command_timeout))
    }

    /// Wraps an existing connection manager.
    pub fn new(conn: ConnectionManager, command_timeout: Duration) -> Self {
        Self {
            conn,
            command_timeout,
        }
    }

    async fn within_deadline<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = RedisResult<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.command_timeout, call).await {
            Ok(reply) => reply.map_err(StoreError::from),
            Err(_) => {
                tracing::warn!(operation, after = ?self.command_timeout, "Redis command timed out");
                Err(StoreError::Timeout {
                    operation,
                    after: self.command_timeout,
                })
            }
        }
    }
}

/// Interprets one `EXEC` reply as an affected count.
fn affected(command: &'static str, reply: Value) -> Result<u64> {
    match reply {
        Value::Okay => Ok(1),
        Value::Nil => Ok(0),
        Value::Int(n) if n >= 0 => Ok(n as u64),
        other => Err(StoreError::UnexpectedReply {
            command,
            reply: format!("{other:?}"),
        }),
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        self.within_deadline("GET", redis::cmd("GET").arg(key).query_async(&mut conn))
            .await
    }

    async fn set_if_present(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        let mut conn = self.conn.clone();
        // SET ... XX answers OK when written and nil when the key is absent
        let reply: Option<String> = self
            .within_deadline(
                "SET XX",
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("XX")
                    .query_async(&mut conn),
            )
            .await?;
        Ok(reply.is_some())
    }

    async fn scan_set(
        &self,
        set: &str,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<ScanPage> {
        let mut conn = self.conn.clone();
        let (cursor, members): (u64, Vec<String>) = self
            .within_deadline(
                "SSCAN",
                redis::cmd("SSCAN")
                    .arg(set)
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(count.max(1))
                    .query_async(&mut conn),
            )
            .await?;
        Ok(ScanPage { cursor, members })
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        self.within_deadline("MGET", redis::cmd("MGET").arg(keys).query_async(&mut conn))
            .await
    }

    async fn execute(&self, batch: WriteBatch) -> Result<Vec<u64>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let commands = batch.into_commands();
        let names: Vec<&'static str> = commands.iter().map(WriteCommand::name).collect();

        let mut pipe = redis::pipe();
        pipe.atomic();
        for command in commands {
            match command {
                WriteCommand::SetIfAbsent { key, value } => {
                    pipe.cmd("SET").arg(key).arg(value).arg("NX");
                }
                WriteCommand::Delete { key } => {
                    pipe.cmd("DEL").arg(key);
                }
                WriteCommand::SetAdd { set, member } => {
                    pipe.cmd("SADD").arg(set).arg(member);
                }
                WriteCommand::SetRemove { set, member } => {
                    pipe.cmd("SREM").arg(set).arg(member);
                }
            }
        }

        let mut conn = self.conn.clone();
        let replies: Vec<Value> = self
            .within_deadline("EXEC", pipe.query_async(&mut conn))
            .await?;

        if replies.len() != names.len() {
            return Err(StoreError::UnexpectedReply {
                command: "EXEC",
                reply: format!("{} replies for {} commands", replies.len(), names.len()),
            });
        }

        names
            .into_iter()
            .zip(replies)
            .map(|(name, reply)| affected(name, reply))
            .collect()
    }
}
