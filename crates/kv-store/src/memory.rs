use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Result,
    store::{KeyValueStore, ScanPage, WriteBatch, WriteCommand},
};

/// A set whose members remember the order they were added in.
///
/// Scan cursors are insertion sequence numbers, so a scan resumes exactly
/// where the previous step stopped regardless of removals in between.
#[derive(Debug, Clone)]
struct ScanSet {
    next_seq: u64,
    by_seq: BTreeMap<u64, String>,
    seq_of: HashMap<String, u64>,
}

impl Default for ScanSet {
    fn default() -> Self {
        Self {
            // 0 is reserved for "start" / "complete"
            next_seq: 1,
            by_seq: BTreeMap::new(),
            seq_of: HashMap::new(),
        }
    }
}

impl ScanSet {
    fn add(&mut self, member: &str) -> bool {
        if self.seq_of.contains_key(member) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_seq.insert(seq, member.to_string());
        self.seq_of.insert(member.to_string(), seq);
        true
    }

    fn remove(&mut self, member: &str) -> bool {
        match self.seq_of.remove(member) {
            Some(seq) => {
                self.by_seq.remove(&seq);
                true
            }
            None => false,
        }
    }

    fn is_empty(&self) -> bool {
        self.seq_of.is_empty()
    }

    fn scan(&self, cursor: u64, pattern: &str, count: usize) -> ScanPage {
        let mut examined = self.by_seq.range(cursor.max(1)..);
        let mut members = Vec::new();
        let mut last_seq = None;

        // Like Redis, COUNT bounds the work done per step and MATCH filters afterwards.
        for (seq, member) in examined.by_ref().take(count.max(1)) {
            last_seq = Some(*seq);
            if matches_pattern(pattern, member) {
                members.push(member.clone());
            }
        }

        let cursor = match (last_seq, examined.next()) {
            (Some(last), Some(_)) => last + 1,
            _ => 0,
        };

        ScanPage { cursor, members }
    }
}

#[derive(Debug, Default)]
struct State {
    strings: HashMap<String, Vec<u8>>,
    sets: HashMap<String, ScanSet>,
}

impl State {
    fn has_members(&self, key: &str) -> bool {
        self.sets.get(key).is_some_and(|s| !s.is_empty())
    }

    fn apply(&mut self, command: WriteCommand) -> u64 {
        match command {
            WriteCommand::SetIfAbsent { key, value } => {
                if self.strings.contains_key(&key) || self.has_members(&key) {
                    0
                } else {
                    self.strings.insert(key, value);
                    1
                }
            }
            WriteCommand::Delete { key } => {
                let removed = self.strings.remove(&key).is_some()
                    || self.sets.remove(&key).is_some_and(|s| !s.is_empty());
                u64::from(removed)
            }
            WriteCommand::SetAdd { set, member } => {
                u64::from(self.sets.entry(set).or_default().add(&member))
            }
            WriteCommand::SetRemove { set, member } => {
                // A drained set stays in place so its sequence numbers keep
                // growing and cursors handed out earlier remain valid.
                self.sets
                    .get_mut(&set)
                    .map_or(0, |members| u64::from(members.remove(&member)))
            }
        }
    }
}

/// In-memory key-value store implementation for testing.
///
/// Provides the same interface as the Redis implementation. Batches are
/// applied under a single write lock, so they are atomic with respect to
/// every other call on the same store.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryKeyValueStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of plain (non-set) keys stored.
    pub async fn key_count(&self) -> usize {
        self.state.read().await.strings.len()
    }

    /// Returns true if a plain value is stored at `key`.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.state.read().await.strings.contains_key(key)
    }

    /// Returns the members of the set named `set`, in insertion order.
    pub async fn set_members(&self, set: &str) -> Vec<String> {
        self.state
            .read()
            .await
            .sets
            .get(set)
            .map(|s| s.by_seq.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the keys of all plain values, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.state.read().await.strings.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Stores `value` at `key` unconditionally, bypassing any index bookkeeping.
    pub async fn put_raw(&self, key: impl Into<String>, value: Vec<u8>) {
        self.state.write().await.strings.insert(key.into(), value);
    }

    /// Clears all keys and sets.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.strings.clear();
        state.sets.clear();
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state.read().await.strings.get(key).cloned())
    }

    async fn set_if_present(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.strings.get_mut(key) {
            Some(existing) => {
                *existing = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn scan_set(
        &self,
        set: &str,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<ScanPage> {
        let state = self.state.read().await;
        Ok(state
            .sets
            .get(set)
            .map(|s| s.scan(cursor, pattern, count))
            .unwrap_or_default())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        let state = self.state.read().await;
        Ok(keys.iter().map(|k| state.strings.get(k).cloned()).collect())
    }

    async fn execute(&self, batch: WriteBatch) -> Result<Vec<u64>> {
        let mut state = self.state.write().await;
        Ok(batch
            .into_commands()
            .into_iter()
            .map(|command| state.apply(command))
            .collect())
    }
}

/// Glob matching with `*` (any run of characters) and `?` (any one character).
fn matches_pattern(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    let (mut p, mut c) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while c < candidate.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, c));
                p += 1;
            }
            Some(&ch) if ch == '?' || ch == candidate[c] => {
                p += 1;
                c += 1;
            }
            _ => match backtrack {
                Some((star_p, star_c)) => {
                    p = star_p + 1;
                    c = star_c + 1;
                    backtrack = Some((star_p, star_c + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&ch| ch == '*')
}
