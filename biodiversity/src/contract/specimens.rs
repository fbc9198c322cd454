//! Specimen creation, update and the administrative logs.

use access_policy::{authorize_category, authorize_group, PolicyCategory};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::BiodiversityContract;
use crate::attribution::Attribution;
use crate::error::{ContractError, Result};
use crate::specimen::{Specimen, SpecimenFields, TransferNote};
use crate::update::{merge_update, UpdateRequest};

/// Replacement values for the log fields, applied by an override.
///
/// A blank value leaves its field alone and the configured sentinel clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverridePatch {
    pub condition: String,
    pub loans: String,
    pub grants: String,
    pub notes: String,
}

/// Which administrative log an entry goes to.
#[derive(Debug, Clone, Copy)]
enum TransferLog {
    Loan,
    Return,
    Grant,
}

impl TransferLog {
    fn category(self) -> PolicyCategory {
        match self {
            Self::Loan | Self::Return => PolicyCategory::RegisterLoan,
            Self::Grant => PolicyCategory::RegisterUse,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Loan => "Loaned",
            Self::Return => "Returned",
            Self::Grant => "Granted",
        }
    }

    fn attribution(self, guid: &str) -> Attribution {
        let guid = guid.to_string();
        match self {
            Self::Loan => Attribution::RegisteredLoan(guid),
            Self::Return => Attribution::ReturnedLoan(guid),
            Self::Grant => Attribution::RegisteredGrant(guid),
        }
    }

    fn log_mut(self, specimen: &mut Specimen) -> &mut String {
        match self {
            Self::Loan | Self::Return => &mut specimen.loans,
            Self::Grant => &mut specimen.grants,
        }
    }
}

impl BiodiversityContract {
    /// Create a specimen with empty loan and grant logs.
    pub async fn create(
        &self,
        guid: &str,
        collection: &str,
        actor: &str,
        fields: SpecimenFields,
    ) -> Result<Specimen> {
        if self.state.key_exists(guid).await? {
            return Err(ContractError::AlreadyExists(guid.to_string()));
        }
        let (policy, role) = self.policy_and_role(actor, collection).await?;
        authorize_category(actor, role, &policy, PolicyCategory::CreateSpecimen)?;

        let specimen = Specimen::create(collection, actor, fields);
        self.state.put_specimen(guid, &specimen).await?;
        self.state
            .record_attribution(actor, &Attribution::CreatedSpecimen(guid.to_string()))
            .await?;

        info!(guid = %guid, collection = %collection, actor = %actor, "Created specimen");
        Ok(specimen)
    }

    /// Merge an update into a specimen.
    ///
    /// Each field group the merge changes is authorized on its own against
    /// the actor's role. A merge that changes nothing but `updater` is
    /// rejected.
    pub async fn update(&self, request: &UpdateRequest) -> Result<Specimen> {
        let guid = request.guid.as_str();
        let actor = request.actor.as_str();

        let stored = self.state.require_specimen(guid).await?;
        let collection = if request.collection.is_empty() {
            stored.collection.as_str()
        } else {
            request.collection.as_str()
        };
        let (policy, role) = self.policy_and_role(actor, collection).await?;

        if collection != stored.collection {
            return Err(ContractError::invalid(format!(
                "collection {collection} does not match existing specimen collection {}",
                stored.collection
            )));
        }

        let merged = merge_update(&stored, request);
        let changed = stored.changed_groups(&merged);
        for group in &changed {
            authorize_group(actor, role, &policy, *group)?;
        }

        if stored.same_content(&merged) {
            return Err(ContractError::NoOpUpdate(guid.to_string()));
        }

        self.state.put_specimen(guid, &merged).await?;
        self.state
            .record_attribution(actor, &Attribution::UpdatedSpecimen(guid.to_string()))
            .await?;

        info!(
            guid = %guid,
            actor = %actor,
            groups = ?changed,
            "Updated specimen"
        );
        Ok(merged)
    }

    /// Overwrite or clear the log fields, bypassing the append rule.
    ///
    /// Gated by the collection's `primaryUpdate` policy alone.
    pub async fn override_history(
        &self,
        guid: &str,
        actor: &str,
        patch: &OverridePatch,
    ) -> Result<Specimen> {
        let mut specimen = self.state.require_specimen(guid).await?;
        let (policy, role) = self.policy_and_role(actor, &specimen.collection).await?;
        authorize_category(actor, role, &policy, PolicyCategory::PrimaryUpdate)?;

        let sentinel = self.config.override_clear_sentinel.as_str();
        let line = |value: &str| format!("{value}\n");
        for (incoming, field, value) in [
            (&patch.condition, &mut specimen.condition, line(&patch.condition)),
            (&patch.loans, &mut specimen.loans, line(&patch.loans)),
            (&patch.grants, &mut specimen.grants, line(&patch.grants)),
            (&patch.notes, &mut specimen.notes, patch.notes.clone()),
        ] {
            if incoming.is_empty() {
                continue;
            }
            if incoming == sentinel {
                field.clear();
            } else {
                *field = value;
            }
        }

        self.state.put_specimen(guid, &specimen).await?;
        self.state
            .record_attribution(actor, &Attribution::OverrodeHistory(guid.to_string()))
            .await?;

        warn!(guid = %guid, actor = %actor, "Overrode specimen history");
        Ok(specimen)
    }

    /// Append a "Loaned:" line to the loan log.
    pub async fn register_loan(
        &self,
        guid: &str,
        actor: &str,
        note: &TransferNote,
    ) -> Result<Specimen> {
        self.append_transfer(guid, actor, note, TransferLog::Loan).await
    }

    /// Append a "Returned:" line to the loan log.
    pub async fn return_loan(
        &self,
        guid: &str,
        actor: &str,
        note: &TransferNote,
    ) -> Result<Specimen> {
        self.append_transfer(guid, actor, note, TransferLog::Return).await
    }

    /// Append a "Granted:" line to the grant log.
    pub async fn register_grant(
        &self,
        guid: &str,
        actor: &str,
        note: &TransferNote,
    ) -> Result<Specimen> {
        self.append_transfer(guid, actor, note, TransferLog::Grant).await
    }

    async fn append_transfer(
        &self,
        guid: &str,
        actor: &str,
        note: &TransferNote,
        log: TransferLog,
    ) -> Result<Specimen> {
        let mut specimen = self.state.require_specimen(guid).await?;
        let (policy, role) = self.policy_and_role(actor, &specimen.collection).await?;
        authorize_category(actor, role, &policy, log.category())?;

        log.log_mut(&mut specimen).push_str(&note.line(log.verb()));
        self.state.put_specimen(guid, &specimen).await?;
        self.state
            .record_attribution(actor, &log.attribution(guid))
            .await?;

        info!(
            guid = %guid,
            actor = %actor,
            recipient = %note.recipient,
            kind = log.verb(),
            "Recorded transfer"
        );
        Ok(specimen)
    }

    /// Read a specimen, gated by the collection's `query` policy.
    pub async fn query(&self, guid: &str, actor: &str) -> Result<Specimen> {
        let specimen = self.state.require_specimen(guid).await?;
        let (policy, role) = self.policy_and_role(actor, &specimen.collection).await?;
        authorize_category(actor, role, &policy, PolicyCategory::Query)?;

        debug!(guid = %guid, actor = %actor, "Queried specimen");
        Ok(specimen)
    }

    /// Rename a taxon across one collection. Returns the number of
    /// specimens rewritten.
    ///
    /// Scans the whole key space in one pass. A failed write stops the scan
    /// and earlier rewrites stay committed.
    pub async fn update_taxon_class(
        &self,
        collection: &str,
        actor: &str,
        old_taxon: &str,
        new_taxon: &str,
    ) -> Result<usize> {
        let (policy, role) = self.policy_and_role(actor, collection).await?;
        authorize_category(actor, role, &policy, PolicyCategory::TaxonClass)?;

        let records = self.state.ledger().range_scan("", "").await?;
        self.warn_if_bulk("update_taxon_class", records.len());

        let mut changed = 0;
        for record in records {
            let Ok(mut specimen) = serde_json::from_slice::<Specimen>(&record.value) else {
                continue;
            };
            if specimen.collection != collection || specimen.taxon != old_taxon {
                continue;
            }

            specimen.taxon = new_taxon.to_string();
            if let Err(err) = self.state.put_specimen(&record.key, &specimen).await {
                warn!(
                    guid = %record.key,
                    committed = changed,
                    error = %err,
                    "Taxon reclassification aborted"
                );
                return Err(err);
            }
            changed += 1;
        }

        self.state
            .record_attribution(
                actor,
                &Attribution::ReclassifiedTaxon {
                    old_taxon: old_taxon.to_string(),
                    new_taxon: new_taxon.to_string(),
                    collection: collection.to_string(),
                },
            )
            .await?;

        info!(
            collection = %collection,
            old_taxon = %old_taxon,
            new_taxon = %new_taxon,
            changed,
            "Reclassified taxon"
        );
        Ok(changed)
    }

    pub(super) fn warn_if_bulk(&self, operation: &str, scanned: usize) {
        if scanned > self.config.bulk_scan_warn_threshold {
            warn!(
                operation = %operation,
                scanned,
                threshold = self.config.bulk_scan_warn_threshold,
                "Bulk scan exceeds threshold; it must still finish within one transaction"
            );
        }
    }
}
