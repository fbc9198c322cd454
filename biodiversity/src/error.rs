//! Error types for contract operations.

use std::fmt;

use access_policy::{PermissionDenied, PolicyError};
use ledger_state::LedgerError;

/// What kind of entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Collection,
    Specimen,
    /// The pending queue of a specimen
    PendingTransactions,
    /// One pending entry addressed by id
    PendingEntry,
    Attribution,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Collection => "collection",
            Self::Specimen => "specimen",
            Self::PendingTransactions => "pending transactions for",
            Self::PendingEntry => "pending transaction",
            Self::Attribution => "attribution for",
        };
        f.write_str(name)
    }
}

/// Error types for contract operations.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// A user, collection, specimen or pending queue is missing
    #[error("{kind} {id} does not exist")]
    NotFound { kind: EntityKind, id: String },

    /// Registration under a key that is already taken
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Role insufficient for the operation or field group
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    /// Malformed index, mismatched collection, bad arity or role code
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The merged record is identical to the stored one
    #[error("Updated specimen {0} is equivalent to old specimen. Operation aborted to conserve ledger resources")]
    NoOpUpdate(String),

    /// Collaborator failure
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Stored bytes did not decode as the expected record
    #[error("Serialization error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl ContractError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<PolicyError> for ContractError {
    fn from(err: PolicyError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ContractError>;
