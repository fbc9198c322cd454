//! Suggest, approve and deny.
//!
//! A suggestion queues the full argument list of an update. Approval removes
//! the entry first and then replays the update as the approver, so the
//! approver's own role must cover every field group the suggestion touches.
//! A replay that fails leaves the entry consumed.

use access_policy::{authorize_category, PolicyCategory};
use tracing::info;

use super::BiodiversityContract;
use crate::attribution::Attribution;
use crate::error::{ContractError, Result};
use crate::pending::{enumerate, PendingEntry, PendingSelector, PendingTransaction};
use crate::specimen::Specimen;
use crate::update::UpdateRequest;

impl BiodiversityContract {
    /// Queue an update for a privileged actor to approve or deny.
    ///
    /// Gated by `flagError`, not by the categories the update itself needs.
    pub async fn suggest_update(
        &self,
        request: &UpdateRequest,
        reason: &str,
    ) -> Result<PendingTransaction> {
        let guid = request.guid.as_str();
        let actor = request.actor.as_str();

        let stored = self.state.require_specimen(guid).await?;
        let role = self.actor_role(actor, &stored.collection).await?;
        if !request.collection.is_empty() && request.collection != stored.collection {
            return Err(ContractError::invalid(format!(
                "collection {} does not match existing specimen collection {}",
                request.collection, stored.collection
            )));
        }
        let policy = self.state.require_collection(&stored.collection).await?;
        authorize_category(actor, role, &policy, PolicyCategory::FlagError)?;

        let mut resolved = request.clone();
        resolved.collection.clone_from(&stored.collection);
        let entry = PendingTransaction::update(&resolved, reason);

        let mut queue = self.state.pending(guid).await?.unwrap_or_default();
        queue.push(entry.clone());
        self.state.put_pending(guid, &queue).await?;
        self.state
            .record_attribution(actor, &Attribution::SuggestedUpdate(guid.to_string()))
            .await?;

        info!(
            guid = %guid,
            suggester = %actor,
            id = %entry.id,
            queued = queue.len(),
            "Queued suggested update"
        );
        Ok(entry)
    }

    /// Approve the entry at a queue position.
    pub async fn approve_transaction(
        &self,
        guid: &str,
        approver: &str,
        index: &str,
    ) -> Result<Specimen> {
        self.approve(guid, approver, PendingSelector::parse_index(index))
            .await
    }

    /// Approve the entry with a stable id.
    pub async fn approve_transaction_by_id(
        &self,
        guid: &str,
        approver: &str,
        id: &str,
    ) -> Result<Specimen> {
        self.approve(guid, approver, Ok(PendingSelector::Id(id.to_string())))
            .await
    }

    /// Deny the entry at a queue position.
    pub async fn deny_transaction(
        &self,
        guid: &str,
        actor: &str,
        index: &str,
    ) -> Result<PendingTransaction> {
        self.deny(guid, actor, PendingSelector::parse_index(index))
            .await
    }

    /// Deny the entry with a stable id.
    pub async fn deny_transaction_by_id(
        &self,
        guid: &str,
        actor: &str,
        id: &str,
    ) -> Result<PendingTransaction> {
        self.deny(guid, actor, Ok(PendingSelector::Id(id.to_string())))
            .await
    }

    /// The queue in order. A specimen with no suggestions has an empty queue.
    pub async fn list_pending(&self, guid: &str) -> Result<Vec<PendingEntry>> {
        let queue = self.state.pending(guid).await?.unwrap_or_default();
        Ok(enumerate(queue))
    }

    /// Load the queue, then resolve the selector against it.
    ///
    /// A missing queue is reported before a malformed selector.
    async fn locate_pending(
        &self,
        guid: &str,
        selector: Result<PendingSelector>,
    ) -> Result<(Vec<PendingTransaction>, usize)> {
        let queue = self.state.require_pending(guid).await?;
        let position = selector?.locate(&queue)?;
        Ok((queue, position))
    }

    async fn approve(
        &self,
        guid: &str,
        approver: &str,
        selector: Result<PendingSelector>,
    ) -> Result<Specimen> {
        let (mut queue, position) = self.locate_pending(guid, selector).await?;
        self.state.require_user(approver).await?;

        let entry = &queue[position];
        let mut request = entry.update_request()?.with_actor(approver);
        let approval = self.config.approval_note(&entry.suggester);
        request.fields.notes = if request.fields.notes.is_empty() {
            approval
        } else {
            format!("{}\n{approval}", request.fields.notes)
        };

        let entry = queue.remove(position);
        self.state.put_pending(guid, &queue).await?;
        info!(
            guid = %guid,
            approver = %approver,
            suggester = %entry.suggester,
            id = %entry.id,
            "Dequeued suggestion for approval"
        );

        let specimen = self.update(&request).await?;
        self.state
            .record_attribution(approver, &Attribution::ApprovedUpdate(guid.to_string()))
            .await?;

        info!(guid = %guid, approver = %approver, id = %entry.id, "Approved suggested update");
        Ok(specimen)
    }

    async fn deny(
        &self,
        guid: &str,
        actor: &str,
        selector: Result<PendingSelector>,
    ) -> Result<PendingTransaction> {
        let (mut queue, position) = self.locate_pending(guid, selector).await?;
        let specimen = self.state.require_specimen(guid).await?;
        let (policy, role) = self.policy_and_role(actor, &specimen.collection).await?;
        authorize_category(actor, role, &policy, PolicyCategory::PrimaryUpdate)?;

        let entry = queue.remove(position);
        self.state.put_pending(guid, &queue).await?;
        self.state
            .record_attribution(actor, &Attribution::DeniedUpdate(guid.to_string()))
            .await?;

        info!(
            guid = %guid,
            actor = %actor,
            suggester = %entry.suggester,
            id = %entry.id,
            "Denied suggested update"
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::fixtures::{with_specimen, COLLECTION};
    use crate::error::EntityKind;
    use crate::specimen::SpecimenFields;

    fn suggestion(actor: &str, fields: SpecimenFields) -> UpdateRequest {
        UpdateRequest::new("42", "", actor, fields, "")
    }

    fn notes(text: &str) -> SpecimenFields {
        SpecimenFields {
            notes: text.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_public_may_suggest() {
        let (_, contract) = with_specimen().await;
        let entry = contract
            .suggest_update(&suggestion("public", notes("wing damaged")), "seen in drawer")
            .await
            .unwrap();

        assert_eq!(entry.suggester, "public");
        assert_eq!(entry.arguments[1], COLLECTION);
        let pending = contract.list_pending("42").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].index, 0);
        assert_eq!(pending[0].transaction.reason, "seen in drawer");
        assert_eq!(
            contract.attribution("public").await.unwrap(),
            "Suggested update to specimen with GUID 42"
        );
    }

    #[tokio::test]
    async fn test_suggest_rejects_other_collection() {
        let (_, contract) = with_specimen().await;
        let mut request = suggestion("public", notes("x"));
        request.collection = "Herps".into();
        assert!(matches!(
            contract.suggest_update(&request, "").await,
            Err(ContractError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_suggester_reported_before_collection_mismatch() {
        let (_, contract) = with_specimen().await;
        let mut request = suggestion("nobody", notes("x"));
        request.collection = "Herps".into();
        assert!(matches!(
            contract.suggest_update(&request, "").await,
            Err(ContractError::NotFound {
                kind: EntityKind::User,
                ..
            })
        ));
        assert!(contract.list_pending("42").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_approve_replays_as_approver() {
        let (_, contract) = with_specimen().await;
        contract
            .suggest_update(&suggestion("student", notes("wing damaged")), "")
            .await
            .unwrap();

        let specimen = contract
            .approve_transaction("42", "manager", "0")
            .await
            .unwrap();
        assert_eq!(
            specimen.notes,
            "collectedwing damaged\nApproved update suggested by user student\n"
        );
        assert_eq!(specimen.updater, "manager");
        assert!(contract.list_pending("42").await.unwrap().is_empty());
        assert_eq!(
            contract.attribution("manager").await.unwrap(),
            "Approved suggested update to specimen with GUID 42"
        );

        // The entry is gone; a second approval of the same index fails
        assert!(matches!(
            contract.approve_transaction("42", "manager", "0").await,
            Err(ContractError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_approval_checks_approver_role_and_consumes_entry() {
        let (_, contract) = with_specimen().await;
        contract
            .suggest_update(
                &suggestion(
                    "public",
                    SpecimenFields {
                        taxon: "B".into(),
                        ..Default::default()
                    },
                ),
                "misidentified",
            )
            .await
            .unwrap();

        // Assistants cannot rename taxa, so the replay fails
        let err = contract
            .approve_transaction("42", "assistant", "0")
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::PermissionDenied(_)));
        assert!(contract.list_pending("42").await.unwrap().is_empty());
        assert_eq!(contract.state().require_specimen("42").await.unwrap().taxon, "A");
    }

    #[tokio::test]
    async fn test_unknown_approver_keeps_entry() {
        let (_, contract) = with_specimen().await;
        contract
            .suggest_update(&suggestion("public", notes("x")), "")
            .await
            .unwrap();

        assert!(matches!(
            contract.approve_transaction("42", "nobody", "0").await,
            Err(ContractError::NotFound {
                kind: EntityKind::User,
                ..
            })
        ));
        assert_eq!(contract.list_pending("42").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_index_errors() {
        let (_, contract) = with_specimen().await;
        assert!(matches!(
            contract.approve_transaction("42", "manager", "zero").await,
            Err(ContractError::NotFound {
                kind: EntityKind::PendingTransactions,
                ..
            })
        ));

        contract
            .suggest_update(&suggestion("public", notes("x")), "")
            .await
            .unwrap();
        for bad in ["zero", "-1", "1"] {
            assert!(matches!(
                contract.deny_transaction("42", "manager", bad).await,
                Err(ContractError::InvalidArgument(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_deny_compacts_queue() {
        let (_, contract) = with_specimen().await;
        for text in ["first", "second", "third"] {
            contract
                .suggest_update(&suggestion("public", notes(text)), text)
                .await
                .unwrap();
        }

        // Denial is gated by primaryUpdate
        assert!(matches!(
            contract.deny_transaction("42", "assistant", "1").await,
            Err(ContractError::PermissionDenied(_))
        ));

        let denied = contract.deny_transaction("42", "curator", "1").await.unwrap();
        assert_eq!(denied.reason, "second");

        let pending = contract.list_pending("42").await.unwrap();
        let reasons: Vec<&str> = pending.iter().map(|p| p.transaction.reason.as_str()).collect();
        assert_eq!(reasons, vec!["first", "third"]);
        assert_eq!(pending[1].index, 1);
        assert_eq!(
            contract.attribution("curator").await.unwrap(),
            "Denied suggested update to specimen with GUID 42"
        );
    }

    #[tokio::test]
    async fn test_stable_ids_survive_compaction() {
        let (_, contract) = with_specimen().await;
        let first = contract
            .suggest_update(&suggestion("public", notes("first")), "")
            .await
            .unwrap();
        let second = contract
            .suggest_update(&suggestion("public", notes("second")), "")
            .await
            .unwrap();

        contract
            .deny_transaction_by_id("42", "manager", &first.id)
            .await
            .unwrap();
        let specimen = contract
            .approve_transaction_by_id("42", "manager", &second.id)
            .await
            .unwrap();
        assert!(specimen.notes.ends_with("second\nApproved update suggested by user public\n"));

        assert!(matches!(
            contract.approve_transaction_by_id("42", "manager", &second.id).await,
            Err(ContractError::NotFound {
                kind: EntityKind::PendingEntry,
                ..
            })
        ));
    }
}
