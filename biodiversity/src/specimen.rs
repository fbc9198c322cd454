//! Specimen records.
//!
//! A specimen is stored flat under its GUID. Its fields are partitioned into
//! five permission-gated groups (see [`FieldGroup`]) plus the administrative
//! `loans` and `grants` logs, which only dedicated operations touch.

use access_policy::FieldGroup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ContractError, Result};

/// Number of positional values making up [`SpecimenFields`].
pub const SPECIMEN_FIELD_COUNT: usize = 18;

/// A specimen record as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specimen {
    /// Owning collection, immutable after creation
    pub collection: String,
    /// Last actor to change the record
    pub updater: String,
    pub catalog_number: String,
    pub accession_number: String,
    pub catalog_date: String,
    pub cataloger: String,
    pub taxon: String,
    pub determiner: String,
    pub determine_date: String,
    pub field_number: String,
    pub field_date: String,
    pub collector: String,
    pub location: String,
    pub latitude: String,
    pub longitude: String,
    pub habitat: String,
    pub preparation: String,
    /// Append-only condition log
    pub condition: String,
    /// Append-only loan log
    pub loans: String,
    /// Append-only usage grant log
    pub grants: String,
    /// Append-only notes log
    pub notes: String,
    pub image: String,
}

/// Editable specimen fields, as supplied to create, update and suggest.
///
/// During an update a blank value means "keep the stored value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenFields {
    pub catalog_number: String,
    pub accession_number: String,
    pub catalog_date: String,
    pub cataloger: String,
    pub taxon: String,
    pub determiner: String,
    pub determine_date: String,
    pub field_number: String,
    pub field_date: String,
    pub collector: String,
    pub location: String,
    pub latitude: String,
    pub longitude: String,
    pub habitat: String,
    pub preparation: String,
    pub condition: String,
    pub notes: String,
    pub image: String,
}

impl SpecimenFields {
    /// Parse the positional field values, in entry-point order:
    /// catalogNumber, accessionNumber, catalogDate, cataloger, taxon,
    /// determiner, determineDate, fieldNumber, fieldDate, collector,
    /// location, latitude, longitude, habitat, preparation, condition,
    /// notes, image.
    pub fn from_positional<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let [catalog_number, accession_number, catalog_date, cataloger, taxon, determiner, determine_date, field_number, field_date, collector, location, latitude, longitude, habitat, preparation, condition, notes, image] =
            values
        else {
            return Err(ContractError::invalid(format!(
                "expected {SPECIMEN_FIELD_COUNT} specimen fields, got {}",
                values.len()
            )));
        };

        let s = |v: &S| v.as_ref().to_string();
        Ok(Self {
            catalog_number: s(catalog_number),
            accession_number: s(accession_number),
            catalog_date: s(catalog_date),
            cataloger: s(cataloger),
            taxon: s(taxon),
            determiner: s(determiner),
            determine_date: s(determine_date),
            field_number: s(field_number),
            field_date: s(field_date),
            collector: s(collector),
            location: s(location),
            latitude: s(latitude),
            longitude: s(longitude),
            habitat: s(habitat),
            preparation: s(preparation),
            condition: s(condition),
            notes: s(notes),
            image: s(image),
        })
    }

    /// Inverse of [`SpecimenFields::from_positional`].
    pub fn to_positional(&self) -> Vec<String> {
        vec![
            self.catalog_number.clone(),
            self.accession_number.clone(),
            self.catalog_date.clone(),
            self.cataloger.clone(),
            self.taxon.clone(),
            self.determiner.clone(),
            self.determine_date.clone(),
            self.field_number.clone(),
            self.field_date.clone(),
            self.collector.clone(),
            self.location.clone(),
            self.latitude.clone(),
            self.longitude.clone(),
            self.habitat.clone(),
            self.preparation.clone(),
            self.condition.clone(),
            self.notes.clone(),
            self.image.clone(),
        ]
    }
}

impl Specimen {
    /// A new record with empty loan and grant logs.
    pub fn create(
        collection: impl Into<String>,
        updater: impl Into<String>,
        fields: SpecimenFields,
    ) -> Self {
        Self {
            collection: collection.into(),
            updater: updater.into(),
            catalog_number: fields.catalog_number,
            accession_number: fields.accession_number,
            catalog_date: fields.catalog_date,
            cataloger: fields.cataloger,
            taxon: fields.taxon,
            determiner: fields.determiner,
            determine_date: fields.determine_date,
            field_number: fields.field_number,
            field_date: fields.field_date,
            collector: fields.collector,
            location: fields.location,
            latitude: fields.latitude,
            longitude: fields.longitude,
            habitat: fields.habitat,
            preparation: fields.preparation,
            condition: fields.condition,
            loans: String::new(),
            grants: String::new(),
            notes: fields.notes,
            image: fields.image,
        }
    }

    /// Values of the fields belonging to a group.
    pub fn group_values(&self, group: FieldGroup) -> Vec<&str> {
        match group {
            FieldGroup::Primary => vec![
                &self.catalog_number,
                &self.accession_number,
                &self.catalog_date,
                &self.cataloger,
                &self.field_number,
                &self.field_date,
                &self.collector,
            ],
            FieldGroup::Geolocation => vec![
                &self.location,
                &self.latitude,
                &self.longitude,
                &self.habitat,
            ],
            FieldGroup::Secondary => vec![&self.preparation, &self.condition, &self.notes],
            FieldGroup::Taxonomy => vec![&self.taxon, &self.determiner, &self.determine_date],
            FieldGroup::Media => vec![&self.image],
        }
        .into_iter()
        .map(String::as_str)
        .collect()
    }

    /// Groups whose values differ between `self` and `other`, in check order.
    pub fn changed_groups(&self, other: &Specimen) -> Vec<FieldGroup> {
        FieldGroup::ALL
            .into_iter()
            .filter(|group| self.group_values(*group) != other.group_values(*group))
            .collect()
    }

    /// Equal in every field except `updater`.
    pub fn same_content(&self, other: &Specimen) -> bool {
        let mut probe = other.clone();
        probe.updater.clone_from(&self.updater);
        *self == probe
    }
}

/// A loan, return or usage grant appended to an administrative log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferNote {
    pub description: String,
    /// Loanee or grantee
    pub recipient: String,
    pub date: String,
}

impl TransferNote {
    pub fn new(
        description: impl Into<String>,
        recipient: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            recipient: recipient.into(),
            date: date.into(),
        }
    }

    /// Log line such as `"Loaned: skull to KU Mammals on 2020-01-01\n"`.
    pub fn line(&self, verb: &str) -> String {
        format!(
            "{verb}: {} to {} on {}\n",
            self.description, self.recipient, self.date
        )
    }
}

/// A specimen together with its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecimenRecord {
    pub guid: String,
    pub specimen: Specimen,
}

/// One committed version of a specimen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenVersion {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
    /// `None` for deletes
    pub specimen: Option<Specimen>,
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample() -> Specimen {
        Specimen::create(
            "KU Ornithology",
            "manager",
            SpecimenFields {
                catalog_number: "32581".into(),
                accession_number: "2002-IC-062".into(),
                catalog_date: "06/19/2003".into(),
                cataloger: "Bentley, Andy C".into(),
                taxon: "Pygoplites diacanthus".into(),
                determiner: "Greenfield, David W".into(),
                field_number: "G02-15".into(),
                field_date: "01/27/2002".into(),
                location: "Fiji, Viti Levu".into(),
                latitude: "18.1483325958".into(),
                longitude: "-178.3984985352".into(),
                habitat: "Barrier reef off Suva Point".into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_create_starts_with_empty_admin_logs() {
        let specimen = sample();
        assert!(specimen.loans.is_empty());
        assert!(specimen.grants.is_empty());
        assert_eq!(specimen.updater, "manager");
    }

    #[test]
    fn test_changed_groups() {
        let old = sample();
        let mut new = old.clone();
        assert!(old.changed_groups(&new).is_empty());

        new.taxon = "Aves".into();
        new.latitude = "0".into();
        assert_eq!(
            old.changed_groups(&new),
            vec![FieldGroup::Geolocation, FieldGroup::Taxonomy]
        );

        // Administrative logs and updater belong to no gated group
        let mut admin = old.clone();
        admin.loans = "Loaned: x to y on z\n".into();
        admin.updater = "curator".into();
        assert!(old.changed_groups(&admin).is_empty());
    }

    #[test]
    fn test_same_content_ignores_only_updater() {
        let old = sample();
        let mut new = old.clone();
        new.updater = "curator".into();
        assert!(old.same_content(&new));

        new.grants = "Granted: a to b on c\n".into();
        assert!(!old.same_content(&new));
    }

    #[test]
    fn test_positional_fields() {
        let fields = sample_fields();
        let values = fields.to_positional();
        assert_eq!(values.len(), SPECIMEN_FIELD_COUNT);
        assert_eq!(SpecimenFields::from_positional(&values[..]).unwrap(), fields);
        assert!(SpecimenFields::from_positional(&values[1..]).is_err());
    }

    fn sample_fields() -> SpecimenFields {
        SpecimenFields {
            taxon: "A".into(),
            condition: "good".into(),
            notes: "n".into(),
            image: "img.png".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_serde_roundtrip_preserves_empty_fields() {
        let specimen = sample();
        let json = serde_json::to_value(&specimen).unwrap();
        assert_eq!(json["catalogNumber"], "32581");
        assert_eq!(json["determineDate"], "");
        assert_eq!(json.as_object().unwrap().len(), 22);

        let back: Specimen = serde_json::from_value(json).unwrap();
        assert_eq!(back, specimen);
    }

    #[test]
    fn test_other_records_do_not_decode_as_specimens() {
        assert!(serde_json::from_str::<Specimen>(r#"{"username": "bob", "membership": {}}"#).is_err());
        assert!(serde_json::from_str::<Specimen>("[]").is_err());
    }

    #[test]
    fn test_transfer_line() {
        let note = TransferNote::new("skull", "KU Mammals", "2020-01-01");
        assert_eq!(note.line("Loaned"), "Loaned: skull to KU Mammals on 2020-01-01\n");
    }
}
