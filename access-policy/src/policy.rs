//! Collection policy tables.
//!
//! A collection's policy maps each of the thirteen operation categories to
//! the set of roles allowed to perform it. Specimen field groups are
//! resolved to their category through a fixed table, never by field name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::role::{PolicyError, RoleSet};

/// Operation categories gated by a collection policy.
///
/// The declaration order is the positional order used by the
/// registration and update entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyCategory {
    CreateSpecimen,
    PrimaryUpdate,
    SecondaryUpdate,
    Georeference,
    LinkImages,
    LinkAuxiliary,
    TaxonName,
    TaxonClass,
    SuggestTaxon,
    RegisterLoan,
    RegisterUse,
    Query,
    FlagError,
}

impl PolicyCategory {
    /// All categories in positional order.
    pub const ALL: [PolicyCategory; 13] = [
        Self::CreateSpecimen,
        Self::PrimaryUpdate,
        Self::SecondaryUpdate,
        Self::Georeference,
        Self::LinkImages,
        Self::LinkAuxiliary,
        Self::TaxonName,
        Self::TaxonClass,
        Self::SuggestTaxon,
        Self::RegisterLoan,
        Self::RegisterUse,
        Self::Query,
        Self::FlagError,
    ];

    /// Field name on the stored collection record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateSpecimen => "createSpecimen",
            Self::PrimaryUpdate => "primaryUpdate",
            Self::SecondaryUpdate => "secondaryUpdate",
            Self::Georeference => "georeference",
            Self::LinkImages => "linkImages",
            Self::LinkAuxiliary => "linkAuxiliary",
            Self::TaxonName => "taxonName",
            Self::TaxonClass => "taxonClass",
            Self::SuggestTaxon => "suggestTaxon",
            Self::RegisterLoan => "registerLoan",
            Self::RegisterUse => "registerUse",
            Self::Query => "query",
            Self::FlagError => "flagError",
        }
    }

    /// What the category permits, phrased for denial messages.
    pub fn action(&self) -> &'static str {
        match self {
            Self::CreateSpecimen => "create specimen",
            Self::PrimaryUpdate => "update primary info",
            Self::SecondaryUpdate => "update secondary info",
            Self::Georeference => "update geolocation info",
            Self::LinkImages => "link images",
            Self::LinkAuxiliary => "link auxiliary records",
            Self::TaxonName => "update taxon name",
            Self::TaxonClass => "update taxon class",
            Self::SuggestTaxon => "suggest taxon",
            Self::RegisterLoan => "register loans",
            Self::RegisterUse => "register usage grants",
            Self::Query => "query specimens",
            Self::FlagError => "suggest updates",
        }
    }
}

/// Independently permissioned subsets of a specimen's fields.
///
/// Loans and grants form a sixth, administrative group that the general
/// update path never touches, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    /// Catalog and field-collection identifiers
    Primary,
    /// Locality and coordinates
    Geolocation,
    /// Preparation, condition log and notes log
    Secondary,
    /// Taxon and determination
    Taxonomy,
    /// Linked image
    Media,
}

impl FieldGroup {
    /// Groups in the order updates are checked.
    pub const ALL: [FieldGroup; 5] = [
        Self::Primary,
        Self::Geolocation,
        Self::Secondary,
        Self::Taxonomy,
        Self::Media,
    ];

    /// The policy category that gates edits to this group.
    pub fn policy_category(&self) -> PolicyCategory {
        match self {
            Self::Primary => PolicyCategory::PrimaryUpdate,
            Self::Geolocation => PolicyCategory::Georeference,
            Self::Secondary => PolicyCategory::SecondaryUpdate,
            Self::Taxonomy => PolicyCategory::TaxonName,
            Self::Media => PolicyCategory::LinkImages,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Geolocation => "geolocation",
            Self::Secondary => "secondary",
            Self::Taxonomy => "taxonomy",
            Self::Media => "media",
        }
    }

    /// Denial wording naming the group.
    pub fn action(&self) -> String {
        format!("update {} fields", self.as_str())
    }
}

/// Access policy of one collection.
///
/// The name is the collection's global key and never changes once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPolicy {
    pub name: String,
    pub create_specimen: RoleSet,
    pub primary_update: RoleSet,
    pub secondary_update: RoleSet,
    pub georeference: RoleSet,
    pub link_images: RoleSet,
    pub link_auxiliary: RoleSet,
    pub taxon_name: RoleSet,
    pub taxon_class: RoleSet,
    pub suggest_taxon: RoleSet,
    pub register_loan: RoleSet,
    pub register_use: RoleSet,
    pub query: RoleSet,
    pub flag_error: RoleSet,
}

impl CollectionPolicy {
    /// A policy where nobody may do anything.
    pub fn closed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create_specimen: RoleSet::empty(),
            primary_update: RoleSet::empty(),
            secondary_update: RoleSet::empty(),
            georeference: RoleSet::empty(),
            link_images: RoleSet::empty(),
            link_auxiliary: RoleSet::empty(),
            taxon_name: RoleSet::empty(),
            taxon_class: RoleSet::empty(),
            suggest_taxon: RoleSet::empty(),
            register_loan: RoleSet::empty(),
            register_use: RoleSet::empty(),
            query: RoleSet::empty(),
            flag_error: RoleSet::empty(),
        }
    }

    /// Build a freshly registered policy; categories absent from the patch
    /// allow nobody.
    pub fn from_patch(name: impl Into<String>, patch: &PolicyPatch) -> Self {
        let mut policy = Self::closed(name);
        policy.apply(patch);
        policy
    }

    /// Roles allowed for a category.
    pub fn allowed(&self, category: PolicyCategory) -> RoleSet {
        *self.slot(category)
    }

    /// Replace the roles for one category.
    pub fn set(&mut self, category: PolicyCategory, roles: RoleSet) {
        *self.slot_mut(category) = roles;
    }

    /// Field-level patch: categories absent from the patch keep their value.
    pub fn apply(&mut self, patch: &PolicyPatch) {
        for (category, roles) in patch.iter() {
            self.set(category, roles);
        }
    }

    fn slot(&self, category: PolicyCategory) -> &RoleSet {
        match category {
            PolicyCategory::CreateSpecimen => &self.create_specimen,
            PolicyCategory::PrimaryUpdate => &self.primary_update,
            PolicyCategory::SecondaryUpdate => &self.secondary_update,
            PolicyCategory::Georeference => &self.georeference,
            PolicyCategory::LinkImages => &self.link_images,
            PolicyCategory::LinkAuxiliary => &self.link_auxiliary,
            PolicyCategory::TaxonName => &self.taxon_name,
            PolicyCategory::TaxonClass => &self.taxon_class,
            PolicyCategory::SuggestTaxon => &self.suggest_taxon,
            PolicyCategory::RegisterLoan => &self.register_loan,
            PolicyCategory::RegisterUse => &self.register_use,
            PolicyCategory::Query => &self.query,
            PolicyCategory::FlagError => &self.flag_error,
        }
    }

    fn slot_mut(&mut self, category: PolicyCategory) -> &mut RoleSet {
        match category {
            PolicyCategory::CreateSpecimen => &mut self.create_specimen,
            PolicyCategory::PrimaryUpdate => &mut self.primary_update,
            PolicyCategory::SecondaryUpdate => &mut self.secondary_update,
            PolicyCategory::Georeference => &mut self.georeference,
            PolicyCategory::LinkImages => &mut self.link_images,
            PolicyCategory::LinkAuxiliary => &mut self.link_auxiliary,
            PolicyCategory::TaxonName => &mut self.taxon_name,
            PolicyCategory::TaxonClass => &mut self.taxon_class,
            PolicyCategory::SuggestTaxon => &mut self.suggest_taxon,
            PolicyCategory::RegisterLoan => &mut self.register_loan,
            PolicyCategory::RegisterUse => &mut self.register_use,
            PolicyCategory::Query => &mut self.query,
            PolicyCategory::FlagError => &mut self.flag_error,
        }
    }
}

/// A partial policy: only the categories it names are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyPatch {
    entries: BTreeMap<PolicyCategory, RoleSet>,
}

impl PolicyPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the roles for a category.
    pub fn with(mut self, category: PolicyCategory, roles: RoleSet) -> Self {
        self.entries.insert(category, roles);
        self
    }

    /// Parse the thirteen positional policy strings, in
    /// [`PolicyCategory::ALL`] order. A blank string leaves its category out
    /// of the patch.
    pub fn from_positional<S: AsRef<str>>(values: &[S]) -> Result<Self, PolicyError> {
        if values.len() != PolicyCategory::ALL.len() {
            return Err(PolicyError::InvalidPolicy(format!(
                "expected {} policy strings, got {}",
                PolicyCategory::ALL.len(),
                values.len()
            )));
        }

        let mut patch = Self::new();
        for (category, value) in PolicyCategory::ALL.into_iter().zip(values) {
            let value = value.as_ref();
            if !value.is_empty() {
                patch.entries.insert(category, RoleSet::parse(value)?);
            }
        }
        Ok(patch)
    }

    pub fn get(&self, category: PolicyCategory) -> Option<RoleSet> {
        self.entries.get(&category).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PolicyCategory, RoleSet)> + '_ {
        self.entries.iter().map(|(c, r)| (*c, *r))
    }
}
