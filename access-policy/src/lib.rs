//! Collection Access Policy for shared specimen ledgers.
//!
//! Specimen records are gated per *field group*, not per record. Every
//! collection carries a policy naming, for each of thirteen operation
//! categories, the set of roles allowed to perform it:
//!
//! - **Roles**: `M` (Manager), `C` (Curator), `A` (Assistant), `S` (Student), `P` (Public)
//! - **Categories**: create, primary/secondary/geolocation/taxonomy/media edits,
//!   loans, usage grants, queries and suggestions
//! - **Field groups**: the five independently permissioned subsets of a specimen
//!
//! # Key Components
//!
//! - [`RoleCode`] / [`RoleSet`]: closed role enumeration and sets of roles
//! - [`CollectionPolicy`]: the per-collection policy table
//! - [`User`]: identity registry record, with [`resolve_role`] defaulting to `P`
//! - [`authorize`]: the access check, failing with [`PermissionDenied`]
//!
//! # Example
//!
//! ```ignore
//! use access_policy::{authorize_category, resolve_role, PolicyCategory};
//!
//! let role = resolve_role(user.as_ref(), &policy.name);
//! authorize_category("bob", role, &policy, PolicyCategory::CreateSpecimen)?;
//! ```

pub mod check;
pub mod identity;
pub mod policy;
pub mod role;

pub use check::{authorize, authorize_category, authorize_group, PermissionDenied};
pub use identity::{check_grant, resolve_role, User};
pub use policy::{CollectionPolicy, FieldGroup, PolicyCategory, PolicyPatch};
pub use role::{PolicyError, RoleCode, RoleSet};
