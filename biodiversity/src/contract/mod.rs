//! The biodiversity contract.
//!
//! Every mutating operation resolves the actor's role for the target
//! collection, checks it against the collection's policy, and only then
//! writes. The actor's attribution slot is written last.

mod registry;
mod reports;
mod specimens;
mod workflow;

use std::sync::Arc;

use access_policy::{resolve_role, CollectionPolicy, RoleCode};
use ledger_state::Ledger;

use crate::config::ContractConfig;
use crate::error::Result;
use crate::state::WorldState;

pub use specimens::OverridePatch;

/// Specimen ledger with per-collection access control.
#[derive(Clone)]
pub struct BiodiversityContract {
    state: WorldState,
    config: ContractConfig,
}

impl BiodiversityContract {
    /// Create a contract over a ledger with the default configuration.
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            state: WorldState::new(ledger),
            config: ContractConfig::default(),
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: ContractConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Role a registered actor holds in `collection`.
    async fn actor_role(&self, actor: &str, collection: &str) -> Result<RoleCode> {
        let user = self.state.require_user(actor).await?;
        Ok(resolve_role(Some(&user), collection))
    }

    /// Load a collection's policy and the actor's role in it.
    async fn policy_and_role(
        &self,
        actor: &str,
        collection: &str,
    ) -> Result<(CollectionPolicy, RoleCode)> {
        let role = self.actor_role(actor, collection).await?;
        let policy = self.state.require_collection(collection).await?;
        Ok((policy, role))
    }
}
