//! In-memory ledger.
//!
//! Every write commits immediately as its own version. History is kept per
//! key with a SHA-256 derived transaction id and a UTC timestamp.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::selector::Selector;
use crate::traits::{HistoryEntry, KeyValue, Ledger, LedgerError};

const UNLIMITED: usize = usize::MAX;

#[derive(Debug, Default)]
struct LedgerInner {
    state: BTreeMap<String, Vec<u8>>,
    history: HashMap<String, Vec<HistoryEntry>>,
    sequence: u64,
}

impl LedgerInner {
    fn next_tx_id(&mut self, key: &str, value: Option<&[u8]>) -> String {
        self.sequence += 1;
        let mut hasher = Sha256::new();
        hasher.update(self.sequence.to_be_bytes());
        hasher.update(key.as_bytes());
        if let Some(value) = value {
            hasher.update(value);
        }
        hex::encode(hasher.finalize())
    }
}

/// Single-process ledger backed by ordered maps.
#[derive(Clone)]
pub struct InMemoryLedger {
    inner: Arc<RwLock<LedgerInner>>,
    /// Writes still allowed before faults start; `UNLIMITED` disables faults
    write_budget: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LedgerInner::default())),
            write_budget: Arc::new(AtomicUsize::new(UNLIMITED)),
        }
    }

    /// Allow `n` more writes, then reject every write after them.
    pub fn fail_writes_after(&self, n: usize) {
        self.write_budget.store(n, Ordering::SeqCst);
    }

    /// Remove any write fault.
    pub fn clear_write_faults(&self) {
        self.write_budget.store(UNLIMITED, Ordering::SeqCst);
    }

    /// Delete a key, recording a delete in its history.
    pub async fn delete(&self, key: &str) -> Result<(), LedgerError> {
        self.take_write_budget(key)?;

        let mut inner = self.inner.write().await;
        inner.state.remove(key);
        let tx_id = inner.next_tx_id(key, None);
        inner
            .history
            .entry(key.to_string())
            .or_default()
            .push(HistoryEntry {
                tx_id,
                value: None,
                timestamp: chrono::Utc::now(),
                is_delete: true,
            });

        tracing::debug!(key = %key, "Deleted key");
        Ok(())
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        self.inner.read().await.state.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.state.is_empty()
    }

    fn take_write_budget(&self, key: &str) -> Result<(), LedgerError> {
        let taken = self
            .write_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |budget| match budget {
                UNLIMITED => Some(UNLIMITED),
                0 => None,
                n => Some(n - 1),
            });

        taken.map(|_| ()).map_err(|_| LedgerError::WriteRejected {
            key: key.to_string(),
            reason: "write fault injected".to_string(),
        })
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let inner = self.inner.read().await;
        tracing::debug!(key = %key, "Reading key");
        Ok(inner.state.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.take_write_budget(key)?;

        let mut inner = self.inner.write().await;
        let tx_id = inner.next_tx_id(key, Some(&value));
        inner
            .history
            .entry(key.to_string())
            .or_default()
            .push(HistoryEntry {
                tx_id,
                value: Some(value.clone()),
                timestamp: chrono::Utc::now(),
                is_delete: false,
            });
        inner.state.insert(key.to_string(), value);

        tracing::debug!(key = %key, "Wrote key");
        Ok(())
    }

    async fn range_scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, LedgerError> {
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start.to_string())
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end.to_string())
        };

        if let (Bound::Included(s), Bound::Excluded(e)) = (&lower, &upper) {
            if s >= e {
                return Ok(Vec::new());
            }
        }

        let inner = self.inner.read().await;
        Ok(inner
            .state
            .range((lower, upper))
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    async fn history_of(&self, key: &str) -> Result<Vec<HistoryEntry>, LedgerError> {
        let inner = self.inner.read().await;
        Ok(inner.history.get(key).cloned().unwrap_or_default())
    }

    async fn rich_query(&self, query: &str) -> Result<Vec<KeyValue>, LedgerError> {
        let selector = Selector::parse(query)?;

        let inner = self.inner.read().await;
        Ok(inner
            .state
            .iter()
            .filter(|(_, value)| selector.matches(value))
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }
}
