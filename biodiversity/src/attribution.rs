//! Attribution log entries.
//!
//! Each actor has one slot holding a description of their most recent
//! action. The slot is overwritten by every mutating operation.

use std::fmt;

use access_policy::RoleCode;

/// Most recent action taken by an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribution {
    RegisteredUser(String),
    RegisteredCollection(String),
    UpdatedCollection(String),
    GrantedPermission {
        grantee: String,
        role: RoleCode,
        collection: String,
    },
    CreatedSpecimen(String),
    UpdatedSpecimen(String),
    SuggestedUpdate(String),
    ApprovedUpdate(String),
    DeniedUpdate(String),
    OverrodeHistory(String),
    RegisteredLoan(String),
    ReturnedLoan(String),
    RegisteredGrant(String),
    ReclassifiedTaxon {
        old_taxon: String,
        new_taxon: String,
        collection: String,
    },
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisteredUser(name) => write!(f, "Registered user {name}"),
            Self::RegisteredCollection(name) => write!(f, "Registered Collection {name}"),
            Self::UpdatedCollection(name) => {
                write!(f, "Updated Collection {name} access control policies")
            }
            Self::GrantedPermission {
                grantee,
                role,
                collection,
            } => write!(
                f,
                "Updated {grantee} permission to {role} in collection {collection}"
            ),
            Self::CreatedSpecimen(guid) => write!(f, "Created Specimen with GUID {guid}"),
            Self::UpdatedSpecimen(guid) => write!(f, "Updated Specimen with GUID {guid}"),
            Self::SuggestedUpdate(guid) => {
                write!(f, "Suggested update to specimen with GUID {guid}")
            }
            Self::ApprovedUpdate(guid) => {
                write!(f, "Approved suggested update to specimen with GUID {guid}")
            }
            Self::DeniedUpdate(guid) => {
                write!(f, "Denied suggested update to specimen with GUID {guid}")
            }
            Self::OverrodeHistory(guid) => write!(
                f,
                "Overrode condition, loan, grant, and/or notes history for specimen with guid {guid}"
            ),
            Self::RegisteredLoan(guid) => write!(f, "Registered loan for specimen with GUID {guid}"),
            Self::ReturnedLoan(guid) => write!(f, "Returned loan for specimen with GUID {guid}"),
            Self::RegisteredGrant(guid) => {
                write!(f, "Registered grant for specimen with GUID {guid}")
            }
            Self::ReclassifiedTaxon {
                old_taxon,
                new_taxon,
                collection,
            } => write!(
                f,
                "Updated all {old_taxon} taxons to {new_taxon} in collection {collection}"
            ),
        }
    }
}
