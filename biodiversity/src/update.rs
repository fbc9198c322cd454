//! Update requests and the blank-preserves-old merge.

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, Result};
use crate::specimen::{Specimen, SpecimenFields};

/// Number of positional arguments of an update.
pub const UPDATE_ARGUMENT_COUNT: usize = 22;

/// A full update of a specimen's editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub guid: String,
    /// Blank resolves to the stored collection
    pub collection: String,
    pub actor: String,
    pub fields: SpecimenFields,
    /// Date stamped onto an appended condition entry
    pub condition_date: String,
}

impl UpdateRequest {
    pub fn new(
        guid: impl Into<String>,
        collection: impl Into<String>,
        actor: impl Into<String>,
        fields: SpecimenFields,
        condition_date: impl Into<String>,
    ) -> Self {
        Self {
            guid: guid.into(),
            collection: collection.into(),
            actor: actor.into(),
            fields,
            condition_date: condition_date.into(),
        }
    }

    /// Parse the positional argument list: guid, collection, updater, the
    /// primary through preparation fields, condition, conditionDate, notes,
    /// image.
    pub fn from_arguments<S: AsRef<str>>(arguments: &[S]) -> Result<Self> {
        if arguments.len() != UPDATE_ARGUMENT_COUNT {
            return Err(ContractError::invalid(format!(
                "expected {UPDATE_ARGUMENT_COUNT} update arguments, got {}",
                arguments.len()
            )));
        }

        let (head, rest) = arguments.split_at(3);
        let (through_condition, tail) = rest.split_at(16);
        let (condition_date, notes_and_image) = tail.split_at(1);

        let positional: Vec<&str> = through_condition
            .iter()
            .chain(notes_and_image)
            .map(|value| value.as_ref())
            .collect();

        Ok(Self::new(
            head[0].as_ref(),
            head[1].as_ref(),
            head[2].as_ref(),
            SpecimenFields::from_positional(&positional[..])?,
            condition_date[0].as_ref(),
        ))
    }

    /// Inverse of [`UpdateRequest::from_arguments`].
    pub fn to_arguments(&self) -> Vec<String> {
        let mut fields = self.fields.to_positional();
        // condition is the 16th field; its date follows it
        fields.insert(16, self.condition_date.clone());

        let mut arguments = Vec::with_capacity(UPDATE_ARGUMENT_COUNT);
        arguments.push(self.guid.clone());
        arguments.push(self.collection.clone());
        arguments.push(self.actor.clone());
        arguments.extend(fields);
        arguments
    }

    /// The same request made by someone else.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }
}

fn keep_or_replace(stored: &str, incoming: &str) -> String {
    if incoming.is_empty() {
        stored.to_string()
    } else {
        incoming.to_string()
    }
}

/// Merge an update into the stored record.
///
/// Blank values keep the stored value. Non-blank `condition` and `notes` are
/// appended to their logs. Loans and grants are carried over untouched and
/// `updater` becomes the request's actor.
pub fn merge_update(stored: &Specimen, request: &UpdateRequest) -> Specimen {
    let fields = &request.fields;

    let condition = if fields.condition.is_empty() {
        stored.condition.clone()
    } else {
        format!(
            "{}{} {}\n",
            stored.condition, fields.condition, request.condition_date
        )
    };
    let notes = if fields.notes.is_empty() {
        stored.notes.clone()
    } else {
        format!("{}{}\n", stored.notes, fields.notes)
    };

    Specimen {
        collection: keep_or_replace(&stored.collection, &request.collection),
        updater: request.actor.clone(),
        catalog_number: keep_or_replace(&stored.catalog_number, &fields.catalog_number),
        accession_number: keep_or_replace(&stored.accession_number, &fields.accession_number),
        catalog_date: keep_or_replace(&stored.catalog_date, &fields.catalog_date),
        cataloger: keep_or_replace(&stored.cataloger, &fields.cataloger),
        taxon: keep_or_replace(&stored.taxon, &fields.taxon),
        determiner: keep_or_replace(&stored.determiner, &fields.determiner),
        determine_date: keep_or_replace(&stored.determine_date, &fields.determine_date),
        field_number: keep_or_replace(&stored.field_number, &fields.field_number),
        field_date: keep_or_replace(&stored.field_date, &fields.field_date),
        collector: keep_or_replace(&stored.collector, &fields.collector),
        location: keep_or_replace(&stored.location, &fields.location),
        latitude: keep_or_replace(&stored.latitude, &fields.latitude),
        longitude: keep_or_replace(&stored.longitude, &fields.longitude),
        habitat: keep_or_replace(&stored.habitat, &fields.habitat),
        preparation: keep_or_replace(&stored.preparation, &fields.preparation),
        condition,
        loans: stored.loans.clone(),
        grants: stored.grants.clone(),
        notes,
        image: keep_or_replace(&stored.image, &fields.image),
    }
}
