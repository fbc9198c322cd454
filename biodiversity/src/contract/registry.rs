//! Identity and collection registration.

use access_policy::{
    authorize, check_grant, CollectionPolicy, PolicyPatch, RoleCode, RoleSet, User,
};
use tracing::info;

use super::BiodiversityContract;
use crate::attribution::Attribution;
use crate::error::{ContractError, Result};

impl BiodiversityContract {
    /// Register a user with no memberships.
    pub async fn register_user(&self, username: &str) -> Result<()> {
        if self.state.key_exists(username).await? {
            return Err(ContractError::AlreadyExists(username.to_string()));
        }

        self.state.put_user(&User::new(username)).await?;
        self.state
            .record_attribution(username, &Attribution::RegisteredUser(username.to_string()))
            .await?;

        info!(user = %username, "Registered user");
        Ok(())
    }

    /// Register a collection and make the registrant its Manager.
    ///
    /// Categories the patch leaves out are closed to every role.
    pub async fn register_collection(
        &self,
        name: &str,
        registrant: &str,
        policy: &PolicyPatch,
    ) -> Result<CollectionPolicy> {
        if self.state.key_exists(name).await? {
            return Err(ContractError::AlreadyExists(name.to_string()));
        }
        let mut user = self.state.require_user(registrant).await?;

        let collection = CollectionPolicy::from_patch(name, policy);
        user.set_role(name, RoleCode::Manager);

        self.state.put_collection(&collection).await?;
        self.state.put_user(&user).await?;
        self.state
            .record_attribution(registrant, &Attribution::RegisteredCollection(name.to_string()))
            .await?;

        info!(collection = %name, registrant = %registrant, "Registered collection");
        Ok(collection)
    }

    /// Patch a collection's policy. Only its Manager may do this.
    pub async fn update_collection(
        &self,
        name: &str,
        actor: &str,
        patch: &PolicyPatch,
    ) -> Result<CollectionPolicy> {
        let mut collection = self.state.require_collection(name).await?;
        let role = self.actor_role(actor, name).await?;

        authorize(
            actor,
            role,
            RoleSet::empty().with(RoleCode::Manager),
            format!("update collection {name} access control policies"),
        )?;

        collection.apply(patch);
        self.state.put_collection(&collection).await?;
        self.state
            .record_attribution(actor, &Attribution::UpdatedCollection(name.to_string()))
            .await?;

        info!(
            collection = %name,
            actor = %actor,
            categories = patch.iter().count(),
            "Updated collection policy"
        );
        Ok(collection)
    }

    /// Set a grantee's role in a collection.
    pub async fn grant_permission(
        &self,
        granter: &str,
        grantee: &str,
        collection: &str,
        role: RoleCode,
    ) -> Result<()> {
        let mut grantee_user = self.state.require_user(grantee).await?;
        let granter_role = self.actor_role(granter, collection).await?;
        self.state.require_collection(collection).await?;

        check_grant(
            granter,
            granter_role,
            grantee,
            grantee_user.role_in(collection),
            role,
            collection,
        )?;

        grantee_user.set_role(collection, role);
        self.state.put_user(&grantee_user).await?;
        self.state
            .record_attribution(
                granter,
                &Attribution::GrantedPermission {
                    grantee: grantee.to_string(),
                    role,
                    collection: collection.to_string(),
                },
            )
            .await?;

        info!(
            granter = %granter,
            grantee = %grantee,
            collection = %collection,
            role = %role,
            "Granted permission"
        );
        Ok(())
    }
}
