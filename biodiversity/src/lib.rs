//! Biodiversity specimen ledger.
//!
//! Shared specimen records on a versioned key-value ledger, gated by
//! per-collection access policies:
//!
//! - **Field-group authorization**: an update is checked separately for each
//!   group of fields it changes
//! - **No-op rejection**: updates that change nothing but the updater are refused
//! - **Suggestions**: low-privilege actors queue updates that a privileged
//!   actor approves (replayed under the approver's role) or denies
//! - **Administrative logs**: loans and usage grants, plus an override escape hatch
//! - **Attribution**: each actor's most recent action
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use biodiversity::BiodiversityContract;
//! use ledger_state::InMemoryLedger;
//!
//! let contract = BiodiversityContract::new(Arc::new(InMemoryLedger::new()));
//! contract.register_user("manager").await?;
//! contract.invoke("Query", &["42".into(), "manager".into()]).await?;
//! ```

pub mod attribution;
pub mod config;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod pending;
pub mod specimen;
pub mod state;
pub mod update;

pub use attribution::Attribution;
pub use config::{ConfigError, ContractConfig, ScanRange};
pub use contract::{BiodiversityContract, OverridePatch};
pub use error::{ContractError, EntityKind, Result};
pub use pending::{PendingEntry, PendingSelector, PendingTransaction, TransactionKind};
pub use specimen::{Specimen, SpecimenFields, SpecimenRecord, SpecimenVersion, TransferNote};
pub use update::{merge_update, UpdateRequest};
