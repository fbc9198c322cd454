//! Core trait for ledger backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Ledger is not reachable
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    /// The platform refused a write
    #[error("Write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },

    /// Rich query could not be parsed or executed
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Stored bytes could not be interpreted
    #[error("Codec error: {0}")]
    Codec(String),
}

/// A key and its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One committed modification of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Transaction that wrote this version
    pub tx_id: String,
    /// Value written; `None` for deletes
    pub value: Option<Vec<u8>>,
    /// Commit time
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
}

/// Versioned key-value world state.
///
/// Keys are plain strings with no implied hierarchy. Each call is one
/// blocking round trip to the platform; implementations decide how writes
/// are grouped into commits.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current value of a key, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Write a new version of a key.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    /// Keys in `[start, end)` in byte order. An empty bound is open on that side.
    async fn range_scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, LedgerError>;

    /// Every committed version of a key, oldest first.
    async fn history_of(&self, key: &str) -> Result<Vec<HistoryEntry>, LedgerError>;

    /// Values matching a selector expression, in key order.
    async fn rich_query(&self, query: &str) -> Result<Vec<KeyValue>, LedgerError>;
}
