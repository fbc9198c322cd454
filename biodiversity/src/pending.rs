//! Pending suggestion queue.
//!
//! Each specimen has an insertion-ordered queue of proposed updates. Entries
//! can be addressed by their current position, which shifts as entries are
//! removed, or by the stable id generated when they were queued.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ContractError, EntityKind, Result};
use crate::update::UpdateRequest;

/// Operation a pending entry will replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Update,
}

/// A proposed operation awaiting approval or denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Stable id, unaffected by queue compaction
    pub id: String,
    #[serde(rename = "transaction")]
    pub kind: TransactionKind,
    /// Positional arguments of the replayed operation
    pub arguments: Vec<String>,
    pub suggester: String,
    pub reason: String,
}

impl PendingTransaction {
    /// Queue an update for later replay.
    pub fn update(request: &UpdateRequest, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: TransactionKind::Update,
            arguments: request.to_arguments(),
            suggester: request.actor.clone(),
            reason: reason.into(),
        }
    }

    /// The update this entry replays.
    pub fn update_request(&self) -> Result<UpdateRequest> {
        match self.kind {
            TransactionKind::Update => UpdateRequest::from_arguments(&self.arguments[..]),
        }
    }
}

/// How a caller addresses one entry of a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingSelector {
    /// Current zero-based position
    Index(usize),
    /// Stable id assigned at suggestion time
    Id(String),
}

impl PendingSelector {
    /// Parse a positional index argument.
    pub fn parse_index(raw: &str) -> Result<Self> {
        raw.parse::<usize>().map(Self::Index).map_err(|e| {
            ContractError::invalid(format!(
                "pending transaction index {raw:?} is not a non-negative integer: {e}"
            ))
        })
    }

    /// Position of the addressed entry in `queue`.
    pub fn locate(&self, queue: &[PendingTransaction]) -> Result<usize> {
        match self {
            Self::Index(index) if *index < queue.len() => Ok(*index),
            Self::Index(index) => Err(ContractError::invalid(format!(
                "pending transaction index {index} is out of range for {} entries",
                queue.len()
            ))),
            Self::Id(id) => queue
                .iter()
                .position(|entry| entry.id == *id)
                .ok_or_else(|| ContractError::not_found(EntityKind::PendingEntry, id.as_str())),
        }
    }
}

/// A queue entry listed with its current position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEntry {
    pub index: usize,
    #[serde(flatten)]
    pub transaction: PendingTransaction,
}

/// Number the queue in order.
pub fn enumerate(queue: Vec<PendingTransaction>) -> Vec<PendingEntry> {
    queue
        .into_iter()
        .enumerate()
        .map(|(index, transaction)| PendingEntry { index, transaction })
        .collect()
}
