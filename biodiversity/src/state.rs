//! Typed access to the world state.

use std::sync::Arc;

use access_policy::{CollectionPolicy, User};
use ledger_state::{Ledger, LedgerError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::attribution::Attribution;
use crate::error::{ContractError, EntityKind, Result};
use crate::keys::{attribution_key, pending_key};
use crate::pending::PendingTransaction;
use crate::specimen::Specimen;

/// Reads and writes contract records as JSON over a [`Ledger`].
#[derive(Clone)]
pub struct WorldState {
    ledger: Arc<dyn Ledger>,
}

impl WorldState {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub async fn key_exists(&self, key: &str) -> Result<bool> {
        Ok(self.ledger.get(key).await?.is_some())
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.ledger.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.ledger.put(key, bytes).await?;
        Ok(())
    }

    async fn require<T: DeserializeOwned>(&self, kind: EntityKind, key: &str) -> Result<T> {
        self.get_json(key)
            .await?
            .ok_or_else(|| ContractError::not_found(kind, key))
    }

    // Users

    pub async fn user(&self, username: &str) -> Result<Option<User>> {
        self.get_json(username).await
    }

    pub async fn require_user(&self, username: &str) -> Result<User> {
        self.require(EntityKind::User, username).await
    }

    pub async fn put_user(&self, user: &User) -> Result<()> {
        self.put_json(&user.username, user).await
    }

    // Collections

    pub async fn require_collection(&self, name: &str) -> Result<CollectionPolicy> {
        self.require(EntityKind::Collection, name).await
    }

    pub async fn put_collection(&self, policy: &CollectionPolicy) -> Result<()> {
        self.put_json(&policy.name, policy).await
    }

    // Specimens

    pub async fn require_specimen(&self, guid: &str) -> Result<Specimen> {
        self.require(EntityKind::Specimen, guid).await
    }

    pub async fn put_specimen(&self, guid: &str, specimen: &Specimen) -> Result<()> {
        self.put_json(guid, specimen).await
    }

    // Pending queues

    /// A specimen's queue, or `None` if nothing was ever suggested.
    pub async fn pending(&self, guid: &str) -> Result<Option<Vec<PendingTransaction>>> {
        self.get_json(&pending_key(guid)).await
    }

    pub async fn require_pending(&self, guid: &str) -> Result<Vec<PendingTransaction>> {
        self.pending(guid)
            .await?
            .ok_or_else(|| ContractError::not_found(EntityKind::PendingTransactions, guid))
    }

    pub async fn put_pending(&self, guid: &str, queue: &[PendingTransaction]) -> Result<()> {
        self.put_json(&pending_key(guid), &queue).await
    }

    // Attribution

    /// Overwrite an actor's attribution slot.
    pub async fn record_attribution(&self, actor: &str, attribution: &Attribution) -> Result<()> {
        let text = attribution.to_string();
        debug!(actor = %actor, attribution = %text, "Recording attribution");
        self.ledger
            .put(&attribution_key(actor), text.into_bytes())
            .await?;
        Ok(())
    }

    pub async fn attribution(&self, actor: &str) -> Result<Option<String>> {
        match self.ledger.get(&attribution_key(actor)).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| LedgerError::Codec(e.to_string()).into()),
            None => Ok(None),
        }
    }
}
