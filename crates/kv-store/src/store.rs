use async_trait::async_trait;

use crate::Result;

/// A single write queued in a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCommand {
    /// Store `value` at `key` only if the key does not exist yet (`SET key value NX`).
    SetIfAbsent { key: String, value: Vec<u8> },

    /// Remove `key` (`DEL key`).
    Delete { key: String },

    /// Add `member` to the set named `set` (`SADD set member`).
    SetAdd { set: String, member: String },

    /// Remove `member` from the set named `set` (`SREM set member`).
    SetRemove { set: String, member: String },
}

impl WriteCommand {
    /// Returns the store command name, for logging and error reporting.
    pub fn name(&self) -> &'static str {
        match self {
            WriteCommand::SetIfAbsent { .. } => "SET NX",
            WriteCommand::Delete { .. } => "DEL",
            WriteCommand::SetAdd { .. } => "SADD",
            WriteCommand::SetRemove { .. } => "SREM",
        }
    }
}

/// An ordered group of writes that the store executes as one unit.
///
/// Nothing reaches the store until the batch is handed to
/// [`KeyValueStore::execute`]. Dropping a batch before that abandons it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    commands: Vec<WriteCommand>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a `SET NX`.
    pub fn set_if_absent(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.commands.push(WriteCommand::SetIfAbsent {
            key: key.into(),
            value,
        });
        self
    }

    /// Queues a `DEL`.
    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.commands.push(WriteCommand::Delete { key: key.into() });
        self
    }

    /// Queues a `SADD`.
    pub fn set_add(mut self, set: impl Into<String>, member: impl Into<String>) -> Self {
        self.commands.push(WriteCommand::SetAdd {
            set: set.into(),
            member: member.into(),
        });
        self
    }

    /// Queues a `SREM`.
    pub fn set_remove(mut self, set: impl Into<String>, member: impl Into<String>) -> Self {
        self.commands.push(WriteCommand::SetRemove {
            set: set.into(),
            member: member.into(),
        });
        self
    }

    /// Returns the queued commands in execution order.
    pub fn commands(&self) -> &[WriteCommand] {
        &self.commands
    }

    /// Returns the number of queued commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing has been queued.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn into_commands(self) -> Vec<WriteCommand> {
        self.commands
    }
}

/// One step of a set scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor to pass to the next scan call. `0` means the scan is complete.
    pub cursor: u64,

    /// Members returned by this step. May be empty even when `cursor` is not `0`.
    pub members: Vec<String>,
}

/// Core trait for key-value store implementations.
///
/// All implementations must be thread-safe (Send + Sync). Cancelling a call
/// (dropping its future) must abandon the in-flight round-trip.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored at `key`.
    ///
    /// Returns None if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrites the value at `key` only if the key already exists (`SET key value XX`).
    ///
    /// Returns false if the key is absent, in which case nothing is written.
    async fn set_if_present(&self, key: &str, value: Vec<u8>) -> Result<bool>;

    /// Scans the members of the set named `set` (`SSCAN set cursor MATCH pattern COUNT count`).
    ///
    /// Start with cursor `0` and keep passing the returned cursor until it is `0` again.
    /// `count` is a hint, not an exact page size.
    async fn scan_set(
        &self,
        set: &str,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<ScanPage>;

    /// Reads several keys at once (`MGET`).
    ///
    /// The result has one slot per requested key, in request order; absent keys are None.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Executes all commands of `batch` as one unit (`MULTI` ... `EXEC`).
    ///
    /// Returns one count per command: `SET NX` yields 1 if written and 0 if the
    /// key already existed, the other commands yield their integer reply.
    async fn execute(&self, batch: WriteBatch) -> Result<Vec<u64>>;
}
