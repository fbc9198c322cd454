//! Ledger world-state collaborator.
//!
//! The contract layer never touches storage directly. It talks to a
//! [`Ledger`]: versioned single-key reads and writes, half-open range
//! scans, per-key history and selector-based rich queries. Consensus,
//! replication and commit ordering belong to the platform behind the trait.
//!
//! [`InMemoryLedger`] is a complete single-process implementation used by
//! tests and by embedders that do not need a distributed ledger.

pub mod memory;
pub mod selector;
pub mod traits;

pub use memory::InMemoryLedger;
pub use selector::Selector;
pub use traits::{HistoryEntry, KeyValue, Ledger, LedgerError};
