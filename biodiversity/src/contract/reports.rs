//! Ungated read-only reports.

use tracing::debug;

use super::BiodiversityContract;
use crate::error::{ContractError, EntityKind, Result};
use crate::specimen::{Specimen, SpecimenRecord, SpecimenVersion};

impl BiodiversityContract {
    /// Every specimen in the configured key range.
    ///
    /// Values that are not specimen records are skipped.
    pub async fn query_all_specimens(&self) -> Result<Vec<SpecimenRecord>> {
        let range = &self.config.specimen_scan;
        let records = self
            .state
            .ledger()
            .range_scan(&range.start_key, &range.end_key)
            .await?;
        self.warn_if_bulk("query_all_specimens", records.len());

        let scanned = records.len();
        let specimens: Vec<SpecimenRecord> = records
            .into_iter()
            .filter_map(|record| {
                serde_json::from_slice::<Specimen>(&record.value)
                    .ok()
                    .map(|specimen| SpecimenRecord {
                        guid: record.key,
                        specimen,
                    })
            })
            .collect();

        debug!(scanned, specimens = specimens.len(), "Listed all specimens");
        Ok(specimens)
    }

    /// Every committed version of a specimen, oldest first.
    pub async fn history(&self, guid: &str) -> Result<Vec<SpecimenVersion>> {
        let entries = self.state.ledger().history_of(guid).await?;

        entries
            .into_iter()
            .map(|entry| -> Result<SpecimenVersion> {
                let specimen = match (&entry.value, entry.is_delete) {
                    (Some(bytes), false) => Some(serde_json::from_slice(bytes)?),
                    _ => None,
                };
                Ok(SpecimenVersion {
                    tx_id: entry.tx_id,
                    timestamp: entry.timestamp,
                    is_delete: entry.is_delete,
                    specimen,
                })
            })
            .collect()
    }

    /// Run a selector query. Every match must decode as a specimen.
    pub async fn rich_query(&self, query: &str) -> Result<Vec<Specimen>> {
        let records = self.state.ledger().rich_query(query).await?;
        debug!(query = %query, matches = records.len(), "Ran rich query");

        records
            .iter()
            .map(|record| serde_json::from_slice(&record.value).map_err(ContractError::from))
            .collect()
    }

    /// The most recent action recorded for an actor.
    pub async fn attribution(&self, username: &str) -> Result<String> {
        self.state
            .attribution(username)
            .await?
            .ok_or_else(|| ContractError::not_found(EntityKind::Attribution, username))
    }
}
